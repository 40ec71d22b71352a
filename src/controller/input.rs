//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{Catalog, Route};
use super::AppController;

impl<C: Catalog> AppController<C> {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let route = self.router.current();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char(c) = key.code {
                return self.handle_control_key(c.to_ascii_lowercase(), &route).await;
            }
        }

        match route {
            // Nothing works without a session
            Route::ConnectionError => Ok(()),
            Route::Search => self.handle_search_key(key).await,
            Route::Artist { .. } => self.handle_artist_key(key).await,
        }
    }

    async fn handle_control_key(&self, c: char, route: &Route) -> Result<()> {
        if c == 'q' {
            self.ui.lock().await.should_quit = true;
            return Ok(());
        }
        if *route == Route::ConnectionError {
            return Ok(());
        }

        match c {
            'p' => self.toggle_playback()?,
            's' => self.toggle_shuffle()?,
            'r' => self.cycle_repeat()?,
            'x' => self.toggle_mute()?,
            'l' => self.toggle_fullscreen()?,
            'n' => self.next_track()?,
            'b' => self.previous_track()?,
            'f' => self.cycle_filters().await,
            _ => {}
        }
        Ok(())
    }

    async fn handle_search_key(&self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char(c) => self.append_to_search(c).await,
            KeyCode::Backspace => self.backspace_search().await,
            KeyCode::Tab => self.navigate_search_section(true).await,
            KeyCode::BackTab => self.navigate_search_section(false).await,
            KeyCode::Up => self.move_selection(false).await,
            KeyCode::Down => self.move_selection(true).await,
            KeyCode::Enter => self.activate_search_selection().await?,
            KeyCode::Esc => self.ui.lock().await.status_message = None,
            _ => self.handle_common_key(key).await?,
        }
        Ok(())
    }

    async fn handle_artist_key(&self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up => self.move_selection(false).await,
            KeyCode::Down => self.move_selection(true).await,
            KeyCode::Enter => {
                if let Some(track) = self.selected_artist_track().await {
                    self.add_to_queue(track).await?;
                }
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.navigate_back().await;
            }
            _ => self.handle_common_key(key).await?,
        }
        Ok(())
    }

    async fn handle_common_key(&self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::PageUp => self.volume_up()?,
            KeyCode::PageDown => self.volume_down()?,
            KeyCode::Delete => self.remove_current_track().await?,
            _ => {}
        }
        Ok(())
    }
}
