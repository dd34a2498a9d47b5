// src/app/mod.rs
//! Application module - host demo state and logic.

pub mod state;

// Re-export the App struct
pub use state::App;
