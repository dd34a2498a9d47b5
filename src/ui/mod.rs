// src/ui/mod.rs
//! UI module - terminal rendering and input for the host demo.

pub mod keybindings;
pub mod tui;
pub mod widgets;

// Re-export main entry point
pub use tui::run;
