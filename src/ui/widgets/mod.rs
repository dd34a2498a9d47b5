// src/ui/widgets/mod.rs
//! Widgets for the host demo UI.

pub mod bands;
pub mod now_playing;

// Re-export widget rendering functions
pub use bands::render_bands;
pub use now_playing::render_now_playing;
