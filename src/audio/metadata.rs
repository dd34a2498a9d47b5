// src/audio/metadata.rs
//! Track metadata extraction using Lofty.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use lofty::file::AudioFile;
use lofty::probe::Probe;

/// Audio properties of a file, as reported by its container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Total track length; zero when the container does not say.
    pub duration: Duration,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
}

/// Probe `path` for its audio properties.
/// This is safe to call from a background thread.
pub fn load_metadata(path: &Path) -> Result<TrackMetadata> {
    let tagged_file = Probe::open(path)?.read()?;
    let props = tagged_file.properties();

    Ok(TrackMetadata {
        duration: props.duration(),
        sample_rate: props.sample_rate(),
        channels: props.channels(),
    })
}
