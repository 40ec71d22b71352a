//! Navigation-related controller methods (search input, sections, artist page)

use crate::model::{Catalog, Route, SearchResultSection, SearchResults, Track};
use super::AppController;

impl<C: Catalog> AppController<C> {
    pub async fn append_to_search(&self, c: char) {
        let mut ui = self.ui.lock().await;
        ui.query.push(c);
        let query = ui.query.clone();
        drop(ui);
        self.search_input_changed(query).await;
    }

    pub async fn backspace_search(&self) {
        let mut ui = self.ui.lock().await;
        ui.query.pop();
        let query = ui.query.clone();
        drop(ui);
        self.search_input_changed(query).await;
    }

    async fn search_input_changed(&self, query: String) {
        {
            let mut ui = self.ui.lock().await;
            ui.selected = 0;
            ui.status_message = None;
        }
        if let Some(search) = self.search().await {
            search.on_input(query);
        }
    }

    pub async fn cycle_filters(&self) {
        let filters = self.ui.lock().await.next_filter_preset();
        tracing::debug!(filters = %crate::model::join_filters(&filters), "Search filters changed");
        if let Some(search) = self.search().await {
            search.set_filters(filters);
        }
    }

    pub async fn navigate_search_section(&self, forward: bool) {
        let mut ui = self.ui.lock().await;
        let filters = ui.filters();
        let mut section = ui.section;
        // skip sections hidden by the current filters
        for _ in 0..4 {
            section = if forward { section.next() } else { section.prev() };
            if filters.iter().any(|f| f.section() == section) {
                break;
            }
        }
        ui.section = section;
        ui.selected = 0;
    }

    pub async fn move_selection(&self, down: bool) {
        let route = self.router.current();
        let results = self.current_results().await;

        let mut ui = self.ui.lock().await;
        let (index, len) = match route {
            Route::Search => {
                let len = results.as_ref().map(|r| r.len_of(ui.section)).unwrap_or(0);
                (&mut ui.selected, len)
            }
            Route::Artist { .. } => {
                let len = ui.artist.as_ref().map(|a| a.top_tracks.len()).unwrap_or(0);
                (&mut ui.artist_selected, len)
            }
            Route::ConnectionError => return,
        };

        if down {
            if *index < len.saturating_sub(1) {
                *index += 1;
            }
        } else if *index > 0 {
            *index -= 1;
        }
    }

    pub async fn current_results(&self) -> Option<SearchResults> {
        self.search().await.and_then(|s| s.state().results)
    }

    pub async fn selected_search_track(&self) -> Option<Track> {
        let results = self.current_results().await?;
        let ui = self.ui.lock().await;
        if ui.section != SearchResultSection::Tracks {
            return None;
        }
        results.tracks.get(ui.selected).cloned()
    }

    pub async fn selected_artist_track(&self) -> Option<Track> {
        let ui = self.ui.lock().await;
        ui.artist
            .as_ref()
            .and_then(|a| a.top_tracks.get(ui.artist_selected).cloned())
    }

    /// Act on the highlighted search result
    pub async fn activate_search_selection(&self) -> anyhow::Result<()> {
        let Some(results) = self.current_results().await else {
            return Ok(());
        };
        let (section, selected) = {
            let ui = self.ui.lock().await;
            (ui.section, ui.selected)
        };

        match section {
            SearchResultSection::Tracks => {
                if let Some(track) = results.tracks.get(selected).cloned() {
                    self.add_to_queue(track).await?;
                }
            }
            SearchResultSection::Artists => {
                if let Some(artist) = results.artists.get(selected) {
                    self.open_artist(artist.id.clone()).await;
                }
            }
            SearchResultSection::Albums => {
                if let Some(album) = results.albums.get(selected) {
                    self.set_status(format!("{} ({}) by {}", album.name, album.year, album.artist))
                        .await;
                }
            }
            SearchResultSection::Playlists => {
                if let Some(playlist) = results.playlists.get(selected) {
                    self.set_status(format!(
                        "{} by {}, {} tracks",
                        playlist.name, playlist.owner, playlist.total_tracks
                    ))
                    .await;
                }
            }
        }
        Ok(())
    }

    /// Show the artist page and load it in the background
    pub async fn open_artist(&self, artist_id: String) {
        let Some(catalog) = self.services.read().await.as_ref().map(|s| s.catalog.clone()) else {
            return;
        };

        tracing::debug!(artist_id = %artist_id, "Opening artist");
        self.router.navigate(Route::Artist { id: artist_id.clone() });
        {
            let mut ui = self.ui.lock().await;
            ui.artist = None;
            ui.artist_loading = true;
            ui.artist_selected = 0;
        }

        let controller = self.clone();
        tokio::spawn(async move {
            let result = catalog.artist_detail(&artist_id).await;
            let still_open = controller.router.current() == Route::Artist { id: artist_id.clone() };

            let mut ui = controller.ui.lock().await;
            ui.artist_loading = false;
            match result {
                Ok(detail) if still_open => ui.artist = Some(detail),
                Ok(_) => tracing::debug!(artist_id = %artist_id, "Artist page closed before load finished"),
                Err(e) => {
                    tracing::warn!(artist_id = %artist_id, error = %e, "Failed to load artist");
                    ui.status_message = Some(Self::format_error(&e));
                }
            }
        });
    }

    pub async fn navigate_back(&self) -> bool {
        let moved = self.router.back();
        if moved {
            let mut ui = self.ui.lock().await;
            ui.artist = None;
            ui.artist_loading = false;
        }
        moved
    }
}
