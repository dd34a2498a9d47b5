// src/lib.rs
//! fftsounds - playback controls and live bass/mid/treble levels behind a
//! single bridge object for an embedding host.
//!
//! The host owns an [`AudioBridge`](bridge::AudioBridge), calls `init`, issues
//! control calls and polls the JSON reports every frame.

pub mod app;
pub mod audio;
pub mod bridge;
pub mod config;
pub mod error;
pub mod fs;
pub mod session;
pub mod ui;

pub use bridge::{AudioBridge, ConnectionState};
pub use error::BridgeError;
