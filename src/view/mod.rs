//! View module - UI rendering
//!
//! - `utils`: Shared helpers (formatting, scrollable lists, styles)
//! - `layout`: Top bar and queue panel
//! - `content`: Search results and the artist page
//! - `progress`: Now-playing bar and fullscreen player
//! - `overlays`: Status notification and connection error screen

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{use_playback, ContextError, Route, UiState};
use crate::search::SearchState;

pub struct AppView;

impl AppView {
    /// Draw one frame. Playback state comes from the store provided to the
    /// calling task.
    pub fn render(
        frame: &mut Frame,
        ui_state: &UiState,
        route: &Route,
        search: Option<&SearchState>,
        failure: Option<&str>,
    ) -> Result<(), ContextError> {
        let playback = use_playback()?.snapshot();

        if *route == Route::ConnectionError {
            overlays::render_connection_error(frame, failure);
            return Ok(());
        }

        if playback.player.fullscreen {
            progress::render_fullscreen(frame, frame.area(), &playback);
            return Ok(());
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + filters
                Constraint::Min(0),    // Main content + queue
                Constraint::Length(3), // Now playing
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, route, search);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(65), // Results or artist page
                Constraint::Percentage(35), // Queue
            ])
            .split(chunks[1]);

        let current_uri = playback.current_track().map(|t| t.uri.as_str());
        match route {
            Route::Artist { .. } => content::render_artist(frame, main_chunks[0], ui_state, current_uri),
            _ => content::render_search(frame, main_chunks[0], ui_state, search, current_uri),
        }
        layout::render_queue(frame, main_chunks[1], &playback);

        progress::render_progress_bar(frame, chunks[2], &playback);

        if let Some(message) = &ui_state.status_message {
            overlays::render_status_notification(frame, message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fake;
    use crate::model::PlaybackStore;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(store: &PlaybackStore, ui: &UiState, route: &Route) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        store.clone().provide_sync(|| {
            terminal
                .draw(|frame| AppView::render(frame, ui, route, None, Some("HTTP 401")).unwrap())
                .unwrap();
        });
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn main_screen_shows_queue_and_now_playing() {
        let store = PlaybackStore::new();
        store.enqueue(fake::track("Opening"));
        let ui = UiState {
            query: "open".into(),
            ..UiState::default()
        };

        let screen = draw(&store, &ui, &Route::Search);
        assert!(screen.contains("open"));
        assert!(screen.contains("Queue (1)"));
        assert!(screen.contains("Opening"));
        assert!(screen.contains("Repeat: Off"));
    }

    #[test]
    fn queue_renders_with_an_out_of_range_current_index() {
        let store = PlaybackStore::new();
        store.enqueue(fake::track("Opening"));
        store.set_current(usize::MAX);

        let screen = draw(&store, &UiState::default(), &Route::Search);
        assert!(screen.contains("Queue (1)"));
        assert!(screen.contains("No track playing"));
    }

    #[test]
    fn connection_error_replaces_the_screen() {
        let store = PlaybackStore::new();
        let screen = draw(&store, &UiState::default(), &Route::ConnectionError);
        assert!(screen.contains("Connection Error"));
        assert!(screen.contains("HTTP 401"));
        assert!(!screen.contains("Queue"));
    }

    #[test]
    fn rendering_outside_the_store_scope_fails() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut result = Ok(());
        terminal
            .draw(|frame| {
                result = AppView::render(frame, &UiState::default(), &Route::Search, None, None);
            })
            .unwrap();
        assert!(result.is_err());
    }
}
