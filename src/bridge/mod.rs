// src/bridge/mod.rs
//! `AudioBridge`: the one object a host application talks to.
//!
//! Every operation is total. Calls made while no session is connected are
//! ignored, bad input is logged and dropped, and reports degrade to `{}`.

pub mod report;
pub mod request;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::audio::{BandAnalyzer, FrequencyBands};
use crate::config::BridgeConfig;
use crate::session::{
    ConnectResult, PendingConnection, PlaybackService, PlayerEvent, RepeatMode, SessionController,
};

pub use report::{TrackInfo, TrackInfoReport, bands_json};
pub use request::{PlaybackRequest, RequestItem};

/// Connection lifecycle of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

enum Link {
    Disconnected,
    Connecting(PendingConnection),
    Connected(Box<dyn SessionController>),
}

/// Facade over a playback service and the band analyzer.
pub struct AudioBridge<S: PlaybackService> {
    service: S,
    analyzer: Arc<BandAnalyzer>,
    config: BridgeConfig,
    link: Link,
}

impl<S: PlaybackService> AudioBridge<S> {
    pub fn new(service: S, analyzer: BandAnalyzer, config: BridgeConfig) -> Self {
        Self {
            service,
            analyzer: Arc::new(analyzer),
            config,
            link: Link::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Disconnected => ConnectionState::Disconnected,
            Link::Connecting(_) => ConnectionState::Connecting,
            Link::Connected(_) => ConnectionState::Connected,
        }
    }

    /// Start connecting to the playback service. Ignored unless disconnected.
    pub fn init(&mut self) {
        if !matches!(self.link, Link::Disconnected) {
            debug!("init ignored: bridge is {}", self.state());
            return;
        }
        info!("Audio bridge initializing...");
        self.link = Link::Connecting(self.service.connect());
        self.dispatch();
    }

    /// Deliver a finished connection on the caller's thread. Hosts call this
    /// once per frame; every public operation calls it too.
    pub fn dispatch(&mut self) {
        let Link::Connecting(pending) = &self.link else {
            return;
        };
        if let Some(result) = pending.try_complete() {
            self.complete_connection(result);
        }
    }

    /// Block up to `timeout` for the pending connection. True once connected.
    pub fn wait_connected(&mut self, timeout: Duration) -> bool {
        if let Link::Connecting(pending) = &self.link {
            if let Some(result) = pending.wait(timeout) {
                self.complete_connection(result);
            }
        }
        self.state() == ConnectionState::Connected
    }

    fn complete_connection(&mut self, result: ConnectResult) {
        match result {
            Ok(mut controller) => {
                let analyzer = Arc::clone(&self.analyzer);
                controller.add_listener(Box::new(move |event| {
                    if let PlayerEvent::IsPlayingChanged(playing) = event {
                        if *playing {
                            analyzer.start();
                        } else {
                            analyzer.stop();
                        }
                    }
                }));
                if controller.is_playing() {
                    self.analyzer.start();
                }
                info!("Session controller connected successfully.");
                self.link = Link::Connected(controller);
            }
            Err(e) => {
                error!("Failed to connect to session controller: {e}");
                self.link = Link::Disconnected;
            }
        }
    }

    fn controller(&mut self) -> Option<&dyn SessionController> {
        self.dispatch();
        match &self.link {
            Link::Connected(controller) => Some(controller.as_ref()),
            _ => None,
        }
    }

    fn with_controller(&mut self, op: &str, f: impl FnOnce(&dyn SessionController)) {
        match self.controller() {
            Some(controller) => f(controller),
            None => debug!("{op} ignored: no session connected"),
        }
    }

    /// Replace the queue with the existing files among `paths` and play it.
    pub fn play<P: AsRef<Path>>(&mut self, paths: &[P]) {
        if self.controller().is_none() {
            debug!("play ignored: no session connected");
            return;
        }
        match PlaybackRequest::resolve(paths) {
            Some(request) => self.start(request),
            None => warn!("play dropped: none of the {} path(s) exist", paths.len()),
        }
    }

    /// [`AudioBridge::play`] with paths joined by the configured delimiter.
    pub fn play_delimited(&mut self, list: &str) {
        if self.controller().is_none() {
            debug!("play_delimited ignored: no session connected");
            return;
        }
        match PlaybackRequest::from_delimited(list, &self.config.path_delimiter) {
            Some(request) => self.start(request),
            None => warn!("play_delimited dropped: no existing path in {list:?}"),
        }
    }

    fn start(&self, request: PlaybackRequest) {
        debug!("Starting playback of {} item(s)", request.items().len());
        self.service.start(request.into_start_command());
    }

    pub fn pause(&mut self) {
        self.with_controller("pause", |c| c.pause());
    }

    pub fn resume(&mut self) {
        self.with_controller("resume", |c| c.play());
    }

    pub fn seek_to_next(&mut self) {
        self.with_controller("seek_to_next", |c| c.seek_to_next_media_item());
    }

    pub fn seek_to_previous(&mut self) {
        self.with_controller("seek_to_previous", |c| c.seek_to_previous_media_item());
    }

    pub fn set_shuffle_mode(&mut self, enabled: bool) {
        self.with_controller("set_shuffle_mode", |c| c.set_shuffle_mode_enabled(enabled));
    }

    /// `0` off, `1` repeat one, `2` repeat all. Other values are ignored.
    pub fn set_repeat_mode(&mut self, mode: i32) {
        let Ok(mode) = RepeatMode::try_from(mode) else {
            warn!("set_repeat_mode ignored: unknown mode {mode}");
            return;
        };
        self.with_controller("set_repeat_mode", |c| c.set_repeat_mode(mode));
    }

    /// Latest analyzer snapshot, zeros before any analysis.
    pub fn frequency_bands(&self) -> FrequencyBands {
        self.analyzer.bands()
    }

    pub fn frequency_data_json(&self) -> String {
        bands_json(&self.frequency_bands())
    }

    pub fn current_track_info(&mut self) -> TrackInfoReport {
        match self.controller() {
            Some(controller) => TrackInfoReport::from_controller(controller),
            None => TrackInfoReport::Empty,
        }
    }

    pub fn current_track_info_json(&mut self) -> String {
        self.current_track_info().to_json()
    }

    pub fn is_playing(&mut self) -> bool {
        self.controller().is_some_and(|c| c.is_playing())
    }

    /// Whether the analyzer worker is currently running.
    pub fn analyzer_running(&self) -> bool {
        self.analyzer.is_running()
    }

    /// Disconnect and stop analysis. Safe to call any number of times; a later
    /// `init` connects afresh.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.link, Link::Disconnected) {
            Link::Connected(mut controller) => {
                info!("Releasing audio bridge resources.");
                // Detach first so no late event restarts the analyzer
                controller.release();
            }
            Link::Connecting(_) => info!("Releasing audio bridge before connection completed."),
            Link::Disconnected => {}
        }
        self.analyzer.stop();
    }

    /// Release everything and drop the playback service.
    pub fn shutdown(mut self) {
        self.release();
    }
}

impl<S: PlaybackService> Drop for AudioBridge<S> {
    fn drop(&mut self) {
        self.release();
    }
}
