// src/ui/widgets/now_playing.rs
//! Now-playing panel: title, state flags and progress.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::bridge::{ConnectionState, TrackInfoReport};
use crate::session::RepeatMode;

/// Render the now-playing panel.
pub fn render_now_playing(
    f: &mut Frame<'_>,
    area: Rect,
    track: &TrackInfoReport,
    connection: ConnectionState,
    shuffle: bool,
    repeat: RepeatMode,
) {
    f.render_widget(
        Block::default().borders(Borders::ALL).title("Now playing"),
        area,
    );

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    let title = match track {
        TrackInfoReport::Active(info) => info.title.clone().unwrap_or_else(|| "Untitled".into()),
        TrackInfoReport::Empty if connection == ConnectionState::Connected => {
            "No track playing".into()
        }
        TrackInfoReport::Empty => format!("Session {connection}"),
    };
    f.render_widget(Paragraph::new(title).wrap(Wrap { trim: true }), inner[0]);

    let playing = matches!(track, TrackInfoReport::Active(info) if info.is_playing);
    let state_icon = if playing {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    };
    let flag = |on: bool| if on { Color::Cyan } else { Color::DarkGray };
    let flags = Line::from(vec![
        Span::styled(" ⏮ ", Style::default().fg(Color::Cyan)),
        state_icon,
        Span::styled(" ⏭ ", Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled("shuffle", Style::default().fg(flag(shuffle))),
        Span::raw("  "),
        Span::styled(
            format!("repeat {repeat}"),
            Style::default().fg(flag(repeat != RepeatMode::Off)),
        ),
    ]);
    f.render_widget(Paragraph::new(flags).alignment(Alignment::Center), inner[1]);

    let (position, duration) = match track {
        TrackInfoReport::Active(info) => (info.position_ms / 1000, info.duration_ms / 1000),
        TrackInfoReport::Empty => (0, 0),
    };
    let ratio = if duration > 0 {
        (position as f64 / duration as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let time_label = format!(
        "{:02}:{:02} / {:02}:{:02}",
        position / 60,
        position % 60,
        duration / 60,
        duration % 60
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
            .ratio(ratio)
            .label(time_label),
        inner[2],
    );
}
