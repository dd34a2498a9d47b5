// src/error.rs
//! Error types shared by the session layer, the bridge and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that can occur below the bridge facade.
///
/// None of these ever reach the host through the facade; they are logged and
/// the facade degrades to its default behaviour.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no audio output device available: {0}")]
    OutputUnavailable(String),

    #[error("session connection failed: {0}")]
    ConnectionFailed(String),

    #[error("playback service went away before the connection completed")]
    ConnectionDropped,

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
