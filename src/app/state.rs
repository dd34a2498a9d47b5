// src/app/state.rs
//! Host application state: polls the bridge like a game loop would.

use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    audio::FrequencyBands,
    bridge::{AudioBridge, TrackInfoReport},
    session::{PlaybackService, RepeatMode},
    ui::{
        keybindings::{HostAction, key_to_action},
        widgets::{render_bands, render_now_playing},
    },
};

/// Main application state.
pub struct App<S: PlaybackService> {
    pub bridge: AudioBridge<S>,
    /// Shuffle/repeat as last requested by the user
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Values from the most recent poll
    pub bands: FrequencyBands,
    pub track: TrackInfoReport,
    pub bands_json: String,
}

impl<S: PlaybackService> App<S> {
    pub fn new(bridge: AudioBridge<S>) -> Self {
        Self {
            bridge,
            shuffle: false,
            repeat: RepeatMode::Off,
            bands: FrequencyBands::default(),
            track: TrackInfoReport::Empty,
            bands_json: String::new(),
        }
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key_to_action(&key) {
            HostAction::TogglePause => {
                if self.bridge.is_playing() {
                    self.bridge.pause();
                } else {
                    self.bridge.resume();
                }
            }
            HostAction::NextTrack => self.bridge.seek_to_next(),
            HostAction::PreviousTrack => self.bridge.seek_to_previous(),
            HostAction::ToggleShuffle => {
                self.shuffle = !self.shuffle;
                self.bridge.set_shuffle_mode(self.shuffle);
            }
            HostAction::CycleRepeat => {
                self.repeat = next_repeat_mode(self.repeat);
                self.bridge.set_repeat_mode(self.repeat as i32);
            }
            HostAction::Quit => return true,
            HostAction::None => {}
        }
        false
    }

    /// Poll the bridge once per frame.
    pub fn refresh(&mut self) {
        self.bridge.dispatch();
        self.bands = self.bridge.frequency_bands();
        self.bands_json = self.bridge.frequency_data_json();
        self.track = self.bridge.current_track_info();
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_now_playing(
            f,
            rows[0],
            &self.track,
            self.bridge.state(),
            self.shuffle,
            self.repeat,
        );
        render_bands(f, rows[1], &self.bands);
        f.render_widget(
            Paragraph::new(self.bands_json.as_str())
                .block(Block::default().borders(Borders::ALL).title("Frequency JSON")),
            rows[2],
        );
    }
}

/// Off -> One -> All -> Off.
pub fn next_repeat_mode(mode: RepeatMode) -> RepeatMode {
    match mode {
        RepeatMode::Off => RepeatMode::One,
        RepeatMode::One => RepeatMode::All,
        RepeatMode::All => RepeatMode::Off,
    }
}
