// src/session/local.rs
//! Local playback service: a rodio engine thread with a play queue, sample
//! capture for the band analyzer, and controllers talking to it over a channel.

use std::fs::File;
use std::io::BufReader;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{
    MediaItem, PendingConnection, PlayQueue, PlaybackService, PlayerEvent, PlayerListener,
    RepeatMode, SessionController, StartCommand,
};
use crate::audio::{SampleCapture, SampleTap, load_metadata};
use crate::error::BridgeError;

/// How often the engine checks for track end and refreshes the position.
const TICK: Duration = Duration::from_millis(50);

/// Commands sent to the engine thread.
enum EngineCommand {
    Connect(Sender<Result<(), BridgeError>>),
    Start(Vec<MediaItem>),
    Play,
    Pause,
    Next,
    Previous,
    SetShuffle(bool),
    SetRepeat(RepeatMode),
    Shutdown,
}

/// Live state mirrored from the engine thread for controllers.
#[derive(Debug, Clone, Default)]
struct SessionStatus {
    current: Option<MediaItem>,
    duration: Option<Duration>,
    position: Duration,
    is_playing: bool,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, PlayerListener)>,
}

/// State shared by the engine, the service and every controller.
#[derive(Default)]
struct Shared {
    status: Mutex<SessionStatus>,
    listeners: Mutex<Listeners>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, SessionStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, event: PlayerEvent) {
        let listeners = self.listeners();
        for (_, listener) in &listeners.entries {
            listener(&event);
        }
    }
}

/// Playback service running in-process on the default audio output.
pub struct LocalPlaybackService {
    cmd_tx: Sender<EngineCommand>,
    shared: Arc<Shared>,
}

impl LocalPlaybackService {
    /// Spawn the engine thread. Decoded samples of whatever plays are copied
    /// into `tap`.
    pub fn new(tap: Arc<SampleTap>) -> Self {
        let (tx, rx) = mpsc::channel::<EngineCommand>();
        let shared = Arc::new(Shared::default());

        let engine_shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name("playback-engine".into())
            .spawn(move || run_engine(rx, engine_shared, tap));
        if let Err(e) = spawned {
            // Commands go nowhere; connect() reports the failure
            warn!("Could not spawn playback engine: {e}");
        }

        Self { cmd_tx: tx, shared }
    }
}

impl PlaybackService for LocalPlaybackService {
    fn connect(&self) -> PendingConnection {
        let (result_tx, pending) = PendingConnection::channel();
        let (ack_tx, ack_rx) = mpsc::channel();

        if self.cmd_tx.send(EngineCommand::Connect(ack_tx)).is_err() {
            let _ = result_tx.send(Err(BridgeError::ConnectionFailed(
                "playback engine is not running".into(),
            )));
            return pending;
        }

        let cmd_tx = self.cmd_tx.clone();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("session-connect".into())
            .spawn(move || {
                let result = match ack_rx.recv() {
                    Ok(Ok(())) => Ok(Box::new(LocalController::new(cmd_tx, shared))
                        as Box<dyn SessionController>),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(BridgeError::ConnectionDropped),
                };
                let _ = result_tx.send(result);
            });
        if let Err(e) = spawned {
            warn!("Could not spawn session connect thread: {e}");
        }
        pending
    }

    fn start(&self, command: StartCommand) {
        let items = command.media_items();
        if items.is_empty() {
            debug!("Ignoring start command without items");
            return;
        }
        if self.cmd_tx.send(EngineCommand::Start(items)).is_err() {
            warn!("Playback engine is gone; start command dropped");
        }
    }
}

impl Drop for LocalPlaybackService {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

/// Controller handed out by [`LocalPlaybackService::connect`].
pub struct LocalController {
    cmd_tx: Sender<EngineCommand>,
    shared: Arc<Shared>,
    listener_ids: Vec<u64>,
    released: bool,
}

impl LocalController {
    fn new(cmd_tx: Sender<EngineCommand>, shared: Arc<Shared>) -> Self {
        Self {
            cmd_tx,
            shared,
            listener_ids: Vec::new(),
            released: false,
        }
    }

    fn send(&self, cmd: EngineCommand) {
        if self.released {
            return;
        }
        let _ = self.cmd_tx.send(cmd);
    }
}

impl SessionController for LocalController {
    fn play(&self) {
        self.send(EngineCommand::Play);
    }

    fn pause(&self) {
        self.send(EngineCommand::Pause);
    }

    fn seek_to_next_media_item(&self) {
        self.send(EngineCommand::Next);
    }

    fn seek_to_previous_media_item(&self) {
        self.send(EngineCommand::Previous);
    }

    fn set_shuffle_mode_enabled(&self, enabled: bool) {
        self.send(EngineCommand::SetShuffle(enabled));
    }

    fn set_repeat_mode(&self, mode: RepeatMode) {
        self.send(EngineCommand::SetRepeat(mode));
    }

    fn is_playing(&self) -> bool {
        self.shared.status().is_playing
    }

    fn current_media_item(&self) -> Option<MediaItem> {
        self.shared.status().current.clone()
    }

    fn duration(&self) -> Option<Duration> {
        self.shared.status().duration
    }

    fn current_position(&self) -> Duration {
        self.shared.status().position
    }

    fn add_listener(&mut self, listener: PlayerListener) {
        if self.released {
            return;
        }
        let mut listeners = self.shared.listeners();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        self.listener_ids.push(id);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // Taking the lock waits out a notification in progress
        let mut listeners = self.shared.listeners();
        listeners
            .entries
            .retain(|(id, _)| !self.listener_ids.contains(id));
        self.listener_ids.clear();
    }
}

impl Drop for LocalController {
    fn drop(&mut self) {
        self.release();
    }
}

/// Engine thread body. Owns the output stream for its whole life.
fn run_engine(rx: Receiver<EngineCommand>, shared: Arc<Shared>, tap: Arc<SampleTap>) {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            warn!("No audio output available: {e}");
            let reason = e.to_string();
            // Keep answering connects so nobody waits forever
            while let Ok(cmd) = rx.recv() {
                match cmd {
                    EngineCommand::Connect(ack) => {
                        let _ = ack.send(Err(BridgeError::OutputUnavailable(reason.clone())));
                    }
                    EngineCommand::Shutdown => break,
                    _ => {}
                }
            }
            return;
        }
    };

    let mut engine = Engine {
        handle,
        sink: None,
        queue: PlayQueue::new(),
        rng: rand::thread_rng(),
        play_when_ready: true,
        was_playing: false,
        shared,
        tap,
    };
    info!("Playback engine ready");

    loop {
        match rx.recv_timeout(TICK) {
            Ok(EngineCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(cmd) => engine.handle(cmd),
            Err(RecvTimeoutError::Timeout) => {}
        }
        engine.tick();
    }

    engine.stop_sink();
    engine.sync_status();
    info!("Playback engine stopped");
    // Keep stream alive until the thread exits
    drop(stream);
}

struct Engine {
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    queue: PlayQueue,
    rng: ThreadRng,
    /// Whether a newly loaded item starts playing or stays paused
    play_when_ready: bool,
    was_playing: bool,
    shared: Arc<Shared>,
    tap: Arc<SampleTap>,
}

impl Engine {
    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Connect(ack) => {
                let _ = ack.send(Ok(()));
            }
            EngineCommand::Start(items) => {
                info!("Starting queue of {} item(s)", items.len());
                self.queue.replace(items, &mut self.rng);
                self.play_when_ready = true;
                self.play_current();
            }
            EngineCommand::Play => {
                self.play_when_ready = true;
                match &self.sink {
                    Some(sink) => sink.play(),
                    // Ended or never loaded: restart the current item
                    None if self.queue.current().is_some() => self.play_current(),
                    None => {}
                }
            }
            EngineCommand::Pause => {
                self.play_when_ready = false;
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
            }
            EngineCommand::Next => {
                if self.queue.skip_next().is_some() {
                    self.play_current();
                }
            }
            EngineCommand::Previous => {
                if self.queue.skip_previous().is_some() {
                    self.play_current();
                }
            }
            EngineCommand::SetShuffle(enabled) => {
                self.queue.set_shuffle(enabled, &mut self.rng);
                debug!("Shuffle {}", if enabled { "on" } else { "off" });
            }
            EngineCommand::SetRepeat(mode) => {
                self.queue.set_repeat_mode(mode);
                debug!("Repeat {mode}");
            }
            EngineCommand::Shutdown => {}
        }
        self.sync_status();
    }

    /// Detect the end of the current item and refresh the mirrored status.
    fn tick(&mut self) {
        let finished = self.sink.as_ref().is_some_and(|sink| sink.empty());
        if finished {
            self.sink = None;
            if self.queue.advance_on_end().is_some() {
                self.play_current();
            } else {
                debug!("Reached end of queue");
            }
        }
        self.sync_status();
    }

    /// Load the queue's current item, skipping items that fail to load.
    fn play_current(&mut self) {
        self.stop_sink();
        for _ in 0..self.queue.len() {
            let Some(item) = self.queue.current().cloned() else {
                break;
            };
            match self.load(&item) {
                Ok(()) => {
                    self.shared.notify(PlayerEvent::MediaItemTransition(Some(item)));
                    return;
                }
                Err(e) => {
                    warn!("Skipping {}: {e:#}", item.title);
                    if self.queue.skip_next().is_none() {
                        break;
                    }
                }
            }
        }
        warn!("Nothing playable in queue");
        self.queue.clear();
        {
            let mut status = self.shared.status();
            status.current = None;
            status.duration = None;
            status.position = Duration::ZERO;
        }
        self.shared.notify(PlayerEvent::MediaItemTransition(None));
    }

    fn load(&mut self, item: &MediaItem) -> Result<()> {
        let path = item
            .uri
            .to_file_path()
            .map_err(|()| anyhow!("not a local file: {}", item.uri))?;
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file)).context("decoding")?;

        let decoder_duration = source.total_duration();
        let duration = match load_metadata(&path) {
            Ok(meta) => {
                debug!(
                    "{}: {:?} Hz, {:?} ch, {:?}",
                    item.title, meta.sample_rate, meta.channels, meta.duration
                );
                Some(meta.duration).filter(|d| !d.is_zero()).or(decoder_duration)
            }
            Err(e) => {
                debug!("No metadata for {}: {e:#}", item.title);
                decoder_duration
            }
        };

        let sink = Sink::try_new(&self.handle).context("creating sink")?;
        let capturing = SampleCapture::new(source.convert_samples::<f32>(), Arc::clone(&self.tap));
        sink.append(capturing);
        if self.play_when_ready {
            sink.play();
        } else {
            sink.pause();
        }
        self.sink = Some(sink);

        let mut status = self.shared.status();
        status.current = Some(item.clone());
        status.duration = duration;
        status.position = Duration::ZERO;
        info!("Now playing {}", item.title);
        Ok(())
    }

    fn stop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn sync_status(&mut self) {
        let is_playing = self
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty());
        {
            let mut status = self.shared.status();
            if let Some(sink) = &self.sink {
                status.position = match status.duration {
                    Some(total) => sink.get_pos().min(total),
                    None => sink.get_pos(),
                };
            }
            status.is_playing = is_playing;
        }
        if is_playing != self.was_playing {
            self.was_playing = is_playing;
            self.shared.notify(PlayerEvent::IsPlayingChanged(is_playing));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    #[test]
    fn connect_completes_either_way() {
        let service = LocalPlaybackService::new(SampleTap::new(4096));
        match service.connect().wait(Duration::from_secs(5)) {
            Some(Ok(controller)) => {
                assert!(controller.current_media_item().is_none());
                assert!(!controller.is_playing());
                assert_eq!(controller.current_position(), Duration::ZERO);
            }
            Some(Err(BridgeError::OutputUnavailable(_))) => {}
            Some(Err(e)) => panic!("unexpected connect error: {e}"),
            None => panic!("connect never completed"),
        }
    }

    #[test]
    fn unplayable_items_leave_no_current_item() {
        let service = LocalPlaybackService::new(SampleTap::new(4096));
        let Some(Ok(mut controller)) = service.connect().wait(Duration::from_secs(5)) else {
            // No output device on this machine
            return;
        };
        let transitions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&transitions);
        controller.add_listener(Box::new(move |event| {
            if let PlayerEvent::MediaItemTransition(None) = event {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let missing = std::env::temp_dir().join("fftsounds-local-missing.mp3");
        service.start(StartCommand {
            uris: vec![Url::from_file_path(&missing).unwrap()],
            display_names: vec!["fftsounds-local-missing.mp3".into()],
        });

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while transitions.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(transitions.load(Ordering::SeqCst), 1);
        assert!(controller.current_media_item().is_none());
        assert!(!controller.is_playing());

        controller.release();
        controller.release();
    }

    #[test]
    fn released_controller_keeps_no_listeners() {
        let shared = Arc::new(Shared::default());
        let (tx, _rx) = mpsc::channel();
        let mut controller = LocalController::new(tx, Arc::clone(&shared));
        controller.add_listener(Box::new(|_| {}));
        controller.add_listener(Box::new(|_| {}));
        assert_eq!(shared.listeners().entries.len(), 2);

        controller.release();
        assert!(shared.listeners().entries.is_empty());
        controller.add_listener(Box::new(|_| {}));
        assert!(shared.listeners().entries.is_empty());
    }
}
