// src/audio/analyzer/snapshot.rs
//! Most-recent band snapshot shared between the analyzer worker and readers.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::FrequencyBands;

/// Holds the latest [`FrequencyBands`]. All three fields are replaced together
/// under a briefly held lock; the generation counts replacements.
#[derive(Debug, Default)]
pub struct SharedBands {
    current: Mutex<FrequencyBands>,
    generation: AtomicU64,
}

impl SharedBands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, bands: FrequencyBands) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = bands;
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Current snapshot, zeros if nothing was ever published.
    pub fn load(&self) -> FrequencyBands {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Number of snapshots published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let shared = SharedBands::new();
        assert_eq!(shared.load(), FrequencyBands::default());
        assert_eq!(shared.generation(), 0);
    }

    #[test]
    fn readers_never_see_mixed_snapshots() {
        let shared = Arc::new(SharedBands::new());
        let writer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let v = if i % 2 == 0 { 0.25 } else { 0.75 };
                    shared.publish(FrequencyBands::new(v, v, v));
                }
            })
        };
        for _ in 0..2_000 {
            let b = shared.load();
            assert!(b.bass == b.mid && b.mid == b.treble, "torn snapshot {b:?}");
        }
        writer.join().unwrap();
        assert_eq!(shared.generation(), 2_000);
    }
}
