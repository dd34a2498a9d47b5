// src/session/queue.rs
//! Play order bookkeeping: shuffle, repeat and next/previous navigation.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{MediaItem, RepeatMode};

/// Items in insertion order plus the order they are played in.
#[derive(Debug, Default)]
pub struct PlayQueue {
    items: Vec<MediaItem>,
    /// Indices into `items`, in play order
    order: Vec<usize>,
    /// Position in `order` of the current item
    cursor: usize,
    shuffle: bool,
    repeat: RepeatMode,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all items; the first item in play order becomes current.
    pub fn replace<R: Rng + ?Sized>(&mut self, items: Vec<MediaItem>, rng: &mut R) {
        self.order = (0..items.len()).collect();
        self.items = items;
        self.cursor = 0;
        if self.shuffle {
            self.order.shuffle(rng);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.order.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Enabling shuffle keeps the current item first and randomizes the rest.
    /// Disabling it returns to insertion order at the current item.
    pub fn set_shuffle<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R) {
        if enabled == self.shuffle {
            return;
        }
        self.shuffle = enabled;
        let Some(&current) = self.order.get(self.cursor) else {
            self.order = (0..self.items.len()).collect();
            return;
        };
        if enabled {
            let mut rest: Vec<usize> = (0..self.items.len()).filter(|&i| i != current).collect();
            rest.shuffle(rng);
            self.order = std::iter::once(current).chain(rest).collect();
            self.cursor = 0;
        } else {
            self.order = (0..self.items.len()).collect();
            self.cursor = current;
        }
    }

    /// Move to the next item on user request. Wraps only with `RepeatMode::All`.
    pub fn skip_next(&mut self) -> Option<&MediaItem> {
        let next = self.next_position(navigation_mode(self.repeat))?;
        self.cursor = next;
        self.current()
    }

    /// Move to the previous item on user request. Wraps only with `RepeatMode::All`.
    pub fn skip_previous(&mut self) -> Option<&MediaItem> {
        if self.order.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.repeat == RepeatMode::All {
            self.cursor = self.order.len() - 1;
        } else {
            return None;
        }
        self.current()
    }

    /// Advance after the current item finished playing. `None` means the
    /// queue is exhausted and playback should stop.
    pub fn advance_on_end(&mut self) -> Option<&MediaItem> {
        let next = self.next_position(self.repeat)?;
        self.cursor = next;
        self.current()
    }

    fn next_position(&self, mode: RepeatMode) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        match mode {
            RepeatMode::One => Some(self.cursor),
            _ if self.cursor + 1 < self.order.len() => Some(self.cursor + 1),
            RepeatMode::All => Some(0),
            RepeatMode::Off => None,
        }
    }
}

/// User navigation ignores single-item repeat.
fn navigation_mode(mode: RepeatMode) -> RepeatMode {
    match mode {
        RepeatMode::One => RepeatMode::Off,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use url::Url;

    fn items(names: &[&str]) -> Vec<MediaItem> {
        names
            .iter()
            .map(|n| MediaItem {
                uri: Url::parse(&format!("file:///music/{n}")).unwrap(),
                title: n.to_string(),
            })
            .collect()
    }

    fn title(item: Option<&MediaItem>) -> Option<&str> {
        item.map(|i| i.title.as_str())
    }

    fn queue(names: &[&str]) -> PlayQueue {
        let mut q = PlayQueue::new();
        q.replace(items(names), &mut StdRng::seed_from_u64(7));
        q
    }

    #[test]
    fn navigation_without_repeat_stops_at_edges() {
        let mut q = queue(&["a", "b", "c"]);
        assert_eq!(title(q.current()), Some("a"));
        assert_eq!(title(q.skip_previous()), None);
        assert_eq!(title(q.current()), Some("a"));
        assert_eq!(title(q.skip_next()), Some("b"));
        assert_eq!(title(q.skip_next()), Some("c"));
        assert_eq!(title(q.skip_next()), None);
        assert_eq!(title(q.current()), Some("c"));
        assert_eq!(title(q.advance_on_end()), None);
    }

    #[test]
    fn repeat_all_wraps_both_ways() {
        let mut q = queue(&["a", "b"]);
        q.set_repeat_mode(RepeatMode::All);
        assert_eq!(title(q.skip_previous()), Some("b"));
        assert_eq!(title(q.skip_next()), Some("a"));
        assert_eq!(title(q.advance_on_end()), Some("b"));
        assert_eq!(title(q.advance_on_end()), Some("a"));
    }

    #[test]
    fn repeat_one_repeats_on_end_but_not_on_skip() {
        let mut q = queue(&["a", "b"]);
        q.set_repeat_mode(RepeatMode::One);
        assert_eq!(title(q.advance_on_end()), Some("a"));
        assert_eq!(title(q.skip_next()), Some("b"));
        assert_eq!(title(q.skip_next()), None);
        assert_eq!(title(q.advance_on_end()), Some("b"));
    }

    #[test]
    fn shuffle_keeps_current_and_visits_everything() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut q = queue(&["a", "b", "c", "d", "e"]);
        q.skip_next();
        q.set_shuffle(true, &mut rng);
        assert!(q.shuffle_enabled());
        assert_eq!(title(q.current()), Some("b"));

        let mut seen = vec![q.current().unwrap().title.clone()];
        while let Some(item) = q.skip_next() {
            seen.push(item.title.clone());
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);

        let current = q.current().unwrap().title.clone();
        q.set_shuffle(false, &mut rng);
        assert_eq!(q.current().unwrap().title, current);
    }

    #[test]
    fn empty_queue_has_nothing() {
        let mut q = PlayQueue::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(q.is_empty());
        assert!(q.current().is_none());
        assert!(q.skip_next().is_none());
        assert!(q.skip_previous().is_none());
        q.set_shuffle(true, &mut rng);
        q.replace(items(&["x", "y", "z"]), &mut rng);
        assert_eq!(q.len(), 3);
        assert!(q.current().is_some());
        q.clear();
        assert!(q.current().is_none());
    }
}
