// src/config/mod.rs
//! Configuration for the band analyzer and the bridge, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BridgeError;

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "fftsounds.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Band analyzer tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// FFT window length in samples (power of two).
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Time between analysis ticks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Exponential smoothing of published values (0.0 = none).
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Width of the auto-sensitivity window below the rolling maximum, in dB.
    #[serde(default = "default_db_range")]
    pub db_range: f32,
    /// Capacity of the shared sample buffer, in mono samples.
    #[serde(default = "default_capture_capacity")]
    pub capture_capacity: usize,
    #[serde(default)]
    pub cutoffs: BandCutoffs,
}

/// Half-open `[low, high)` frequency ranges in Hz for each band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BandCutoffs {
    #[serde(default = "default_bass")]
    pub bass: (f32, f32),
    #[serde(default = "default_mid")]
    pub mid: (f32, f32),
    #[serde(default = "default_treble")]
    pub treble: (f32, f32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Separator used by `AudioBridge::play_delimited`.
    #[serde(default = "default_path_delimiter")]
    pub path_delimiter: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            interval_ms: default_interval_ms(),
            smoothing: default_smoothing(),
            db_range: default_db_range(),
            capture_capacity: default_capture_capacity(),
            cutoffs: BandCutoffs::default(),
        }
    }
}

impl Default for BandCutoffs {
    fn default() -> Self {
        Self {
            bass: default_bass(),
            mid: default_mid(),
            treble: default_treble(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            path_delimiter: default_path_delimiter(),
        }
    }
}

fn default_window_size() -> usize {
    2048
}

fn default_interval_ms() -> u64 {
    50
}

fn default_smoothing() -> f32 {
    0.6
}

fn default_db_range() -> f32 {
    60.0
}

fn default_capture_capacity() -> usize {
    16384
}

fn default_bass() -> (f32, f32) {
    (20.0, 250.0)
}

fn default_mid() -> (f32, f32) {
    (250.0, 4000.0)
}

fn default_treble() -> (f32, f32) {
    (4000.0, 20000.0)
}

fn default_path_delimiter() -> String {
    "|".into()
}

impl Config {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Find a config file: explicit path, then the working directory, then the
    /// platform config directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        let platform = dirs::config_dir()?.join("fftsounds").join("config.toml");
        platform.exists().then_some(platform)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        self.analyzer.validate()?;
        if self.bridge.path_delimiter.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "bridge.path_delimiter must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.window_size < 64 || !self.window_size.is_power_of_two() {
            return Err(BridgeError::InvalidConfig(format!(
                "analyzer.window_size must be a power of two >= 64, got {}",
                self.window_size
            )));
        }
        if self.interval_ms == 0 {
            return Err(BridgeError::InvalidConfig("analyzer.interval_ms must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(BridgeError::InvalidConfig(format!(
                "analyzer.smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        if !(self.db_range > 0.0) {
            return Err(BridgeError::InvalidConfig("analyzer.db_range must be positive".into()));
        }
        if self.capture_capacity < self.window_size {
            return Err(BridgeError::InvalidConfig(format!(
                "analyzer.capture_capacity ({}) must hold at least one window ({})",
                self.capture_capacity, self.window_size
            )));
        }
        self.cutoffs.validate()
    }
}

impl BandCutoffs {
    pub fn validate(&self) -> Result<(), BridgeError> {
        let bands = [
            ("bass", self.bass),
            ("mid", self.mid),
            ("treble", self.treble),
        ];
        for (name, (low, high)) in bands {
            if !(low >= 0.0 && low < high) {
                return Err(BridgeError::InvalidConfig(format!(
                    "analyzer.cutoffs.{name} must satisfy 0 <= low < high, got [{low}, {high})"
                )));
            }
        }
        if self.bass.1 > self.mid.0 || self.mid.1 > self.treble.0 {
            return Err(BridgeError::InvalidConfig(
                "analyzer.cutoffs must be ascending and non-overlapping".into(),
            ));
        }
        Ok(())
    }
}
