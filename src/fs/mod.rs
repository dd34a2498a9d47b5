// src/fs/mod.rs
//! Filesystem module - audio file detection and input expansion.

pub mod detection;
pub mod scan;

// Re-export commonly used types
pub use detection::{FileCategory, FileType, detect_file_type};
pub use scan::{audio_files_in, expand_inputs};
