// src/audio/mod.rs
//! Audio module - sample capture, band analysis and track metadata.

pub mod analyzer;
pub mod bands;
pub mod metadata;
pub mod sample_capture;

// Re-export commonly used types
pub use analyzer::BandAnalyzer;
pub use bands::FrequencyBands;
pub use metadata::{TrackMetadata, load_metadata};
pub use sample_capture::{SampleCapture, SampleTap, SampleWindow};
