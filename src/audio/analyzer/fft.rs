// src/audio/analyzer/fft.rs
//! FFT computation and bass/mid/treble grouping.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::audio::FrequencyBands;
use crate::config::{AnalyzerConfig, BandCutoffs};

/// Lowest level any band can report, in dBFS.
const FLOOR_DB: f32 = -100.0;
/// The rolling maximum never drops below this, so silence stays dark.
const MIN_REFERENCE_DB: f32 = -30.0;

/// FFT processor turning a window of mono samples into [`FrequencyBands`].
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    cutoffs: BandCutoffs,
    /// Auto-sensitivity: rolling reference level (dBFS)
    max_db: f32,
    db_range: f32,
}

impl FftProcessor {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let size = config.window_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(size);
        Self {
            fft,
            window: hann_window(size),
            cutoffs: config.cutoffs,
            max_db: -10.0,
            db_range: config.db_range,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window.len()
    }

    /// Compute the band snapshot for `samples` recorded at `sample_rate`.
    ///
    /// Shorter input is zero-padded, longer input is truncated to the window.
    pub fn compute(&mut self, samples: &[f32], sample_rate: u32) -> FrequencyBands {
        let magnitudes = self.magnitude_spectrum(samples);
        let [bass, mid, treble] = self.band_levels_db(&magnitudes, sample_rate);
        self.normalize(bass, mid, treble)
    }

    /// Windowed FFT, returning linear magnitudes of the first half of the bins.
    fn magnitude_spectrum(&self, samples: &[f32]) -> Vec<f32> {
        let size = self.window.len();
        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .take(size)
            .zip(&self.window)
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        // Single-sided amplitude, Hann coherent gain is 0.5
        let scale = 4.0 / size as f32;
        buffer[..size / 2].iter().map(|c| c.norm() * scale).collect()
    }

    /// Average magnitude of each band's bins, in dBFS.
    fn band_levels_db(&self, magnitudes: &[f32], sample_rate: u32) -> [f32; 3] {
        let resolution = sample_rate as f32 / self.window.len() as f32;
        let level = |(low, high): (f32, f32)| -> f32 {
            if resolution <= 0.0 {
                return FLOOR_DB;
            }
            let start = (low / resolution).ceil() as usize;
            let end = ((high / resolution).ceil() as usize).min(magnitudes.len());
            if start >= end {
                return FLOOR_DB;
            }
            let mean = magnitudes[start..end].iter().sum::<f32>() / (end - start) as f32;
            (20.0 * mean.max(1e-10).log10()).max(FLOOR_DB)
        };
        [
            level(self.cutoffs.bass),
            level(self.cutoffs.mid),
            level(self.cutoffs.treble),
        ]
    }

    /// Map dB levels into `[0, 1]` against the rolling reference.
    fn normalize(&mut self, bass: f32, mid: f32, treble: f32) -> FrequencyBands {
        let frame_max = bass.max(mid).max(treble);
        // Move slowly toward the loudest band of this frame
        let target = frame_max.max(MIN_REFERENCE_DB);
        self.max_db = 0.9 * self.max_db + 0.1 * target;
        let min_db = self.max_db - self.db_range;

        let scale = |db: f32| (db - min_db) / self.db_range;
        FrequencyBands::new(scale(bass), scale(mid), scale(treble))
    }
}

/// Periodic Hann window of `size` points.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn sine(freq: f32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / RATE as f32).sin())
            .collect()
    }

    fn processor() -> FftProcessor {
        FftProcessor::new(&AnalyzerConfig::default())
    }

    #[test]
    fn hann_window_shape() {
        let w = hann_window(1024);
        assert!(w[0].abs() < 1e-6);
        assert!((w[512] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn tone_lands_in_its_band() {
        let mut fft = processor();
        let size = fft.window_size();

        let low = fft.compute(&sine(100.0, size, 0.8), RATE);
        assert!(low.bass > low.mid && low.bass > low.treble, "{low:?}");

        let mid = fft.compute(&sine(1_000.0, size, 0.8), RATE);
        assert!(mid.mid > mid.bass && mid.mid > mid.treble, "{mid:?}");

        let high = fft.compute(&sine(8_000.0, size, 0.8), RATE);
        assert!(high.treble > high.bass && high.treble > high.mid, "{high:?}");
    }

    #[test]
    fn silence_is_dark() {
        let mut fft = processor();
        let bands = fft.compute(&vec![0.0; fft.window_size()], RATE);
        assert_eq!(bands, FrequencyBands::default());
    }

    #[test]
    fn short_input_is_padded_and_values_stay_in_range() {
        let mut fft = processor();
        for _ in 0..20 {
            let bands = fft.compute(&sine(440.0, 300, 1.0), RATE);
            for v in [bands.bass, bands.mid, bands.treble] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn treble_is_empty_below_its_nyquist() {
        let mut fft = processor();
        // Nyquist is 3 kHz, so the treble range has no bins at all
        let bands = fft.compute(&sine(100.0, fft.window_size(), 0.8), 6_000);
        assert_eq!(bands.treble, 0.0);
    }
}
