// src/audio/analyzer/mod.rs
//! Background bass/mid/treble analyzer fed from the playback sample tap.

mod fft;
mod snapshot;

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::{FrequencyBands, SampleTap};
use crate::config::AnalyzerConfig;

pub use fft::{FftProcessor, hann_window};
pub use snapshot::SharedBands;

/// Running worker: dropping `stop_tx` (or sending on it) wakes it up to exit.
struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically turns the newest samples of the tap into a published
/// [`FrequencyBands`] snapshot on its own thread.
///
/// `start` and `stop` may be called from any thread. Once `stop` returns the
/// worker has exited and the snapshot will not change until the next `start`.
pub struct BandAnalyzer {
    tap: Arc<SampleTap>,
    config: AnalyzerConfig,
    bands: Arc<SharedBands>,
    worker: Mutex<Option<Worker>>,
}

impl BandAnalyzer {
    pub fn new(tap: Arc<SampleTap>, config: AnalyzerConfig) -> Self {
        Self {
            tap,
            config,
            bands: Arc::new(SharedBands::new()),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker unless it is already running.
    pub fn start(&self) {
        let mut worker = self.lock_worker();
        if worker.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tap = Arc::clone(&self.tap);
        let bands = Arc::clone(&self.bands);
        let config = self.config.clone();
        // Only samples written after this point count as fresh
        let mut seen = tap.written();

        let spawned = thread::Builder::new()
            .name("band-analyzer".into())
            .spawn(move || {
                let interval = Duration::from_millis(config.interval_ms);
                let mut processor = FftProcessor::new(&config);
                let mut smoothed = bands.load();

                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    // Keep the last snapshot while no fresh audio arrives
                    let Some(window) = tap.latest(processor.window_size(), seen) else {
                        continue;
                    };
                    seen = window.written;
                    let frame = processor.compute(&window.samples, window.sample_rate);
                    smoothed = smoothed.smoothed_toward(&frame, config.smoothing);
                    bands.publish(smoothed);
                }
            });

        match spawned {
            Ok(handle) => {
                info!("Band analyzer started");
                *worker = Some(Worker { stop_tx, handle });
            }
            Err(e) => warn!("Could not spawn band analyzer thread: {e}"),
        }
    }

    /// Stop the worker and wait for it to exit. No-op when not running.
    pub fn stop(&self) {
        let Some(Worker { stop_tx, handle }) = self.lock_worker().take() else {
            return;
        };
        let _ = stop_tx.send(());
        if handle.join().is_err() {
            warn!("Band analyzer thread panicked");
        }
        info!("Band analyzer stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lock_worker().is_some()
    }

    /// Latest published snapshot; zeros before the first analysis.
    pub fn bands(&self) -> FrequencyBands {
        self.bands.load()
    }

    /// Count of snapshots published since creation.
    pub fn generation(&self) -> u64 {
        self.bands.generation()
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                debug!("Recovering poisoned analyzer lock");
                poisoned.into_inner()
            }
        }
    }
}

impl Drop for BandAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn fast_config() -> AnalyzerConfig {
        AnalyzerConfig {
            window_size: 1024,
            interval_ms: 5,
            smoothing: 0.0,
            ..AnalyzerConfig::default()
        }
    }

    fn feed_tone(tap: &SampleTap, freq: f32, len: usize) {
        let samples: Vec<f32> = (0..len)
            .map(|i| 0.8 * (2.0 * std::f32::consts::PI * freq * i as f32 / 44_100.0).sin())
            .collect();
        assert!(tap.push_samples(&samples));
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn publishes_while_running_and_freezes_after_stop() {
        let tap = SampleTap::new(8192);
        tap.reset(44_100);
        let analyzer = BandAnalyzer::new(Arc::clone(&tap), fast_config());
        assert_eq!(analyzer.bands(), FrequencyBands::default());

        analyzer.start();
        assert!(analyzer.is_running());
        feed_tone(&tap, 100.0, 2048);
        assert!(wait_for(|| analyzer.generation() > 0));
        let bands = analyzer.bands();
        assert!(bands.bass > bands.treble, "{bands:?}");

        analyzer.stop();
        assert!(!analyzer.is_running());
        let frozen = analyzer.generation();
        feed_tone(&tap, 8_000.0, 2048);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(analyzer.generation(), frozen);
        assert_eq!(analyzer.bands(), bands);
    }

    #[test]
    fn retains_snapshot_without_fresh_samples() {
        let tap = SampleTap::new(8192);
        tap.reset(44_100);
        let analyzer = BandAnalyzer::new(Arc::clone(&tap), fast_config());
        analyzer.start();
        feed_tone(&tap, 1_000.0, 2048);
        assert!(wait_for(|| analyzer.generation() > 0));

        let generation = analyzer.generation();
        let bands = analyzer.bands();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(analyzer.generation(), generation);
        assert_eq!(analyzer.bands(), bands);
        analyzer.stop();
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let analyzer = BandAnalyzer::new(SampleTap::new(2048), fast_config());
        analyzer.stop();
        analyzer.start();
        analyzer.start();
        assert!(analyzer.is_running());
        analyzer.stop();
        analyzer.stop();
        assert!(!analyzer.is_running());
    }
}
