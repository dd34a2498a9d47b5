// src/session/mod.rs
//! Playback session seam: the service that plays media and the controller
//! used to command and observe it.

pub mod local;
pub mod queue;

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use url::Url;

use crate::error::BridgeError;

pub use local::LocalPlaybackService;
pub use queue::PlayQueue;

/// One playable entry in the session's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub uri: Url,
    pub title: String,
}

/// What happens when the end of an item (or the queue) is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    Off = 0,
    One = 1,
    All = 2,
}

impl TryFrom<i32> for RepeatMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RepeatMode::Off),
            1 => Ok(RepeatMode::One),
            2 => Ok(RepeatMode::All),
            other => Err(other),
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        };
        write!(f, "{}", s)
    }
}

/// Request to replace the session queue and start playing it.
///
/// `uris` and `display_names` are parallel lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartCommand {
    pub uris: Vec<Url>,
    pub display_names: Vec<String>,
}

impl StartCommand {
    /// Pair URIs with their names; a missing name becomes "Unknown".
    pub fn media_items(&self) -> Vec<MediaItem> {
        self.uris
            .iter()
            .enumerate()
            .map(|(i, uri)| MediaItem {
                uri: uri.clone(),
                title: self
                    .display_names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".into()),
            })
            .collect()
    }
}

/// Notifications emitted by a session to its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    IsPlayingChanged(bool),
    MediaItemTransition(Option<MediaItem>),
}

pub type PlayerListener = Box<dyn Fn(&PlayerEvent) + Send + Sync>;

/// Commands and live state of a connected playback session.
pub trait SessionController: Send {
    fn play(&self);
    fn pause(&self);
    fn seek_to_next_media_item(&self);
    fn seek_to_previous_media_item(&self);
    fn set_shuffle_mode_enabled(&self, enabled: bool);
    fn set_repeat_mode(&self, mode: RepeatMode);

    fn is_playing(&self) -> bool;
    fn current_media_item(&self) -> Option<MediaItem>;
    /// `None` while the duration of the current item is unknown.
    fn duration(&self) -> Option<Duration>;
    fn current_position(&self) -> Duration;

    /// Listeners are invoked from the session's own thread.
    fn add_listener(&mut self, listener: PlayerListener);
    /// Detach from the session. No listener added through this controller
    /// runs after this returns.
    fn release(&mut self);
}

/// A service that accepts start commands and hands out controllers.
pub trait PlaybackService {
    /// Begin connecting a controller; completion arrives through the returned
    /// [`PendingConnection`].
    fn connect(&self) -> PendingConnection;
    fn start(&self, command: StartCommand);
}

pub type ConnectResult = Result<Box<dyn SessionController>, BridgeError>;

/// The not-yet-delivered result of [`PlaybackService::connect`].
pub struct PendingConnection {
    rx: Receiver<ConnectResult>,
}

impl PendingConnection {
    /// A pending connection plus the sender that completes it.
    pub fn channel() -> (mpsc::Sender<ConnectResult>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Already completed connection.
    pub fn ready(result: ConnectResult) -> Self {
        let (tx, pending) = Self::channel();
        let _ = tx.send(result);
        pending
    }

    /// Non-blocking check. `None` while still connecting.
    pub fn try_complete(&self) -> Option<ConnectResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(BridgeError::ConnectionDropped)),
        }
    }

    /// Block for up to `timeout`. `None` if it did not complete in time.
    pub fn wait(&self, timeout: Duration) -> Option<ConnectResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(BridgeError::ConnectionDropped)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("file://{path}")).unwrap()
    }

    #[test]
    fn repeat_mode_from_int() {
        assert_eq!(RepeatMode::try_from(0), Ok(RepeatMode::Off));
        assert_eq!(RepeatMode::try_from(1), Ok(RepeatMode::One));
        assert_eq!(RepeatMode::try_from(2), Ok(RepeatMode::All));
        assert_eq!(RepeatMode::try_from(3), Err(3));
        assert_eq!(RepeatMode::try_from(-1), Err(-1));
    }

    #[test]
    fn start_command_pairs_names() {
        let command = StartCommand {
            uris: vec![url("/music/a.mp3"), url("/music/b.mp3")],
            display_names: vec!["a.mp3".into()],
        };
        let items = command.media_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "a.mp3");
        assert_eq!(items[1].title, "Unknown");
        assert_eq!(items[1].uri.path(), "/music/b.mp3");
    }

    #[test]
    fn pending_connection_reports_dropped_sender() {
        let (tx, pending) = PendingConnection::channel();
        assert!(pending.try_complete().is_none());
        drop(tx);
        assert!(matches!(
            pending.try_complete(),
            Some(Err(BridgeError::ConnectionDropped))
        ));
    }
}
