// src/audio/sample_capture.rs
//! A wrapper source that copies playback samples into a circular buffer for analysis.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuf::{HeapRb, traits::*};
use rodio::Source;

/// Mono samples batched on the audio thread before touching the shared buffer.
const BATCH_LEN: usize = 256;

/// Shared circular buffer of the most recent mono samples of the playing track.
///
/// Written from the audio pipeline, read by the analyzer worker.
pub struct SampleTap {
    buffer: Mutex<HeapRb<f32>>,
    sample_rate: AtomicU32,
    /// Total samples accepted since creation; lets readers detect fresh data.
    written: AtomicU64,
}

/// A copy of the most recent samples taken from a [`SampleTap`].
#[derive(Debug, Clone)]
pub struct SampleWindow {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Value of the tap's write counter when the copy was taken.
    pub written: u64,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            buffer: Mutex::new(HeapRb::new(capacity.max(1))),
            sample_rate: AtomicU32::new(0),
            written: AtomicU64::new(0),
        })
    }

    /// Forget buffered samples, e.g. when a new track starts.
    pub fn reset(&self, sample_rate: u32) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        self.sample_rate.store(sample_rate, Ordering::Release);
    }

    /// Append samples without ever waiting on the lock. Returns false if the
    /// batch was dropped because the reader held the buffer.
    pub fn push_samples(&self, samples: &[f32]) -> bool {
        let Ok(mut buf) = self.buffer.try_lock() else {
            return false;
        };
        for &sample in samples {
            // Overwrite the oldest sample when full
            if buf.is_full() {
                let _ = buf.try_pop();
            }
            let _ = buf.try_push(sample);
        }
        self.written.fetch_add(samples.len() as u64, Ordering::Release);
        true
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Copy the newest `len` samples, but only if anything was written after
    /// `seen` and a full window is buffered.
    pub fn latest(&self, len: usize, seen: u64) -> Option<SampleWindow> {
        let written = self.written();
        let sample_rate = self.sample_rate();
        if written == seen || sample_rate == 0 {
            return None;
        }
        let buf = self.buffer.lock().ok()?;
        let available = buf.occupied_len();
        if available < len {
            return None;
        }
        let samples: Vec<f32> = buf.iter().skip(available - len).copied().collect();
        Some(SampleWindow {
            samples,
            sample_rate,
            written,
        })
    }
}

/// A wrapper source that downmixes frames into a [`SampleTap`] while passing
/// the source samples through untouched.
pub struct SampleCapture<S> {
    source: S,
    tap: Arc<SampleTap>,
    channels: u16,
    frame_sum: f32,
    frame_pos: u16,
    pending: Vec<f32>,
}

impl<S> SampleCapture<S>
where
    S: Source<Item = f32>,
{
    /// Wrap `source` and point `tap` at its sample rate.
    pub fn new(source: S, tap: Arc<SampleTap>) -> Self {
        let channels = source.channels().max(1);
        tap.reset(source.sample_rate());
        Self {
            source,
            tap,
            channels,
            frame_sum: 0.0,
            frame_pos: 0,
            pending: Vec::with_capacity(BATCH_LEN),
        }
    }

    fn capture(&mut self, sample: f32) {
        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos < self.channels {
            return;
        }
        self.pending.push(self.frame_sum / self.channels as f32);
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        if self.pending.len() >= BATCH_LEN {
            // A contended batch is simply lost
            self.tap.push_samples(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S> Iterator for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.source.next()?;
        self.capture(sample);
        Some(sample)
    }
}

impl<S> Source for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.source.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn latest_requires_fresh_full_window() {
        let tap = SampleTap::new(8);
        tap.reset(48_000);
        assert!(tap.latest(4, 0).is_none());

        assert!(tap.push_samples(&[1.0, 2.0, 3.0]));
        assert!(tap.latest(4, 0).is_none());

        assert!(tap.push_samples(&[4.0, 5.0]));
        let window = tap.latest(4, 0).unwrap();
        assert_eq!(window.samples, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(window.sample_rate, 48_000);
        assert_eq!(window.written, 5);

        // Nothing new since the last read
        assert!(tap.latest(4, window.written).is_none());
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let tap = SampleTap::new(4);
        tap.reset(44_100);
        tap.push_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(tap.latest(4, 0).unwrap().samples, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn push_is_dropped_while_reader_holds_lock() {
        let tap = SampleTap::new(16);
        tap.reset(44_100);
        let guard = tap.buffer.lock().unwrap();
        assert!(!tap.push_samples(&[1.0]));
        drop(guard);
        assert_eq!(tap.written(), 0);
    }

    #[test]
    fn capture_downmixes_and_passes_through() {
        let tap = SampleTap::new(1024);
        // Stereo frames: (1, 0) -> 0.5, (0.5, 0.5) -> 0.5
        let frames: Vec<f32> = (0..BATCH_LEN).flat_map(|_| [1.0, 0.0]).collect();
        let source = SamplesBuffer::new(2, 22_050, frames.clone());
        let capture = SampleCapture::new(source, tap.clone());
        assert_eq!(capture.sample_rate(), 22_050);

        let out: Vec<f32> = capture.collect();
        assert_eq!(out, frames);
        assert_eq!(tap.written(), BATCH_LEN as u64);
        let window = tap.latest(BATCH_LEN, 0).unwrap();
        assert!(window.samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));
        assert_eq!(window.sample_rate, 22_050);
    }
}
