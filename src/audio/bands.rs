// src/audio/bands.rs
//! The bass/mid/treble snapshot published by the analyzer.

use serde::Serialize;

/// Normalized intensity of the three coarse frequency bands.
///
/// Every field is always within `[0.0, 1.0]`; the default is all zeros so a
/// reader never sees an absent value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrequencyBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl FrequencyBands {
    pub fn new(bass: f32, mid: f32, treble: f32) -> Self {
        Self {
            bass: unit(bass),
            mid: unit(mid),
            treble: unit(treble),
        }
    }

    /// Exponential blend toward `next`. `factor` is the weight kept from `self`.
    pub fn smoothed_toward(&self, next: &FrequencyBands, factor: f32) -> Self {
        let blend = |old: f32, new: f32| factor * old + (1.0 - factor) * new;
        Self::new(
            blend(self.bass, next.bass),
            blend(self.mid, next.mid),
            blend(self.treble, next.treble),
        )
    }
}

fn unit(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_and_scrubs_non_finite() {
        let bands = FrequencyBands::new(1.5, f32::NAN, -0.2);
        assert_eq!(bands, FrequencyBands { bass: 1.0, mid: 0.0, treble: 0.0 });
        assert_eq!(FrequencyBands::new(f32::INFINITY, 0.5, 0.25).bass, 0.0);
    }

    #[test]
    fn smoothing_moves_part_way() {
        let old = FrequencyBands::new(0.0, 1.0, 0.5);
        let new = FrequencyBands::new(1.0, 0.0, 0.5);
        let mixed = old.smoothed_toward(&new, 0.75);
        assert!((mixed.bass - 0.25).abs() < 1e-6);
        assert!((mixed.mid - 0.75).abs() < 1e-6);
        assert!((mixed.treble - 0.5).abs() < 1e-6);
    }
}
