//! Layout rendering (top bar, queue panel)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{join_filters, PlaybackState, Route, UiState};
use crate::search::SearchState;
use super::content::track_items;
use super::utils::{border_style, render_scrollable_list};

pub fn render_top_bar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    route: &Route,
    search: Option<&SearchState>,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(36), // Filters
        ])
        .split(area);

    let is_focused = *route == Route::Search;
    let search_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.query.is_empty() {
        "Type to search...".to_string()
    } else if search.is_some_and(SearchState::is_loading) {
        format!("{} ...", ui_state.query)
    } else {
        ui_state.query.clone()
    };

    let search_bar = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(search_bar, chunks[0]);

    let filters = Paragraph::new(join_filters(&ui_state.filters()))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Filters (Ctrl-F) "));
    frame.render_widget(filters, chunks[1]);
}

pub fn render_queue(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let current = playback.player.current;
    let current_uri = playback.current_track().map(|t| t.uri.as_str());
    let content_width = area.width.saturating_sub(4) as usize;

    let mut list_items = track_items(&playback.queue, current, false, current_uri, content_width);
    if playback.queue.is_empty() {
        list_items.push(
            ListItem::new("       Queue is empty").style(Style::default().fg(Color::DarkGray)),
        );
    }

    let queue_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Queue ({}) ", playback.queue.len()))
        .padding(Padding::horizontal(1));

    render_scrollable_list(frame, area, list_items, current.saturating_add(1), queue_block);
}
