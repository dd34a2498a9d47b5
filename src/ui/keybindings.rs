// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Host actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostAction {
    TogglePause,
    NextTrack,
    PreviousTrack,
    ToggleShuffle,
    CycleRepeat,
    Quit,
    None,
}

/// Convert a key event to a host action.
pub fn key_to_action(key: &KeyEvent) -> HostAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return HostAction::Quit;
    }

    match key.code {
        KeyCode::Char(' ') => HostAction::TogglePause,
        KeyCode::Char('n') | KeyCode::Char('>') | KeyCode::Right => HostAction::NextTrack,
        KeyCode::Char('p') | KeyCode::Char('<') | KeyCode::Left => HostAction::PreviousTrack,
        KeyCode::Char('s') => HostAction::ToggleShuffle,
        KeyCode::Char('r') => HostAction::CycleRepeat,
        KeyCode::Char('q') | KeyCode::Esc => HostAction::Quit,
        _ => HostAction::None,
    }
}
