//! Now-playing bar rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::model::{PlaybackState, PlayerState};
use super::utils::format_duration;

fn status_text(playback: &PlaybackState) -> String {
    match playback.current_track() {
        None => " No track playing".to_string(),
        Some(track) => {
            let icon = if playback.player.is_playing { " ▶" } else { "⏸ " };
            format!("{} {} | {} ({})", icon, track.name, track.artist_line(), track.album)
        }
    }
}

fn controls_text(player: &PlayerState) -> String {
    let shuffle_text = if player.shuffled { "Shuffle: On" } else { "Shuffle: Off" };
    let volume_text = if player.muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", player.volume)
    };
    format!(" {} | {} | {} ", shuffle_text, player.repeat.label(), volume_text)
}

fn progress(playback: &PlaybackState) -> (f64, String) {
    let duration_ms = playback.current_track().map(|t| t.duration_ms).unwrap_or(0);
    let played_ms = playback
        .player
        .played_seconds
        .map(|s| (s * 1000.0) as u32)
        .unwrap_or(0);
    let ratio = playback.player.played.unwrap_or(0.0).clamp(0.0, 1.0);

    let time_str = format!("{} / {}", format_duration(played_ms), format_duration(duration_ms));
    (ratio, time_str)
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let (ratio, time_str) = progress(playback);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text(playback)))
                .title_bottom(Line::from(controls_text(&playback.player)).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}

/// Whole-screen player
pub fn render_fullscreen(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Track info
            Constraint::Length(3), // Progress bar
        ])
        .split(area);

    let lines = match playback.current_track() {
        Some(track) => vec![
            Line::from(track.name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from(track.artist_line()).style(Style::default().fg(Color::Cyan)),
            Line::from(track.album.clone()).style(Style::default().fg(Color::DarkGray)),
        ],
        None => vec![Line::from("No track playing").style(Style::default().fg(Color::DarkGray))],
    };

    let info = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Now Playing (Ctrl-L to exit) "),
    );
    frame.render_widget(info, chunks[0]);

    render_progress_bar(frame, chunks[1], playback);
}
