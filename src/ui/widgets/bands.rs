// src/ui/widgets/bands.rs
//! Bass/mid/treble gauges.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::audio::FrequencyBands;

/// Render one horizontal gauge per band.
pub fn render_bands(f: &mut Frame<'_>, area: Rect, bands: &FrequencyBands) {
    f.render_widget(Block::default().borders(Borders::ALL).title("Bands"), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let gauges = [
        ("bass", bands.bass, Color::Red),
        ("mid", bands.mid, Color::Yellow),
        ("treble", bands.treble, Color::Cyan),
    ];
    for ((name, value, color), row) in gauges.into_iter().zip(rows.iter()) {
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(color))
                .ratio(f64::from(value).clamp(0.0, 1.0))
                .label(format!("{name} {value:.2}")),
            *row,
        );
    }
}
