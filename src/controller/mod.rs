//! Controller module - Application logic and event handling
//!
//! - `input`: Key event handling
//! - `navigation`: Search input, result sections and the artist page
//! - `playback`: Queue and player flag commands

mod input;
mod navigation;
mod playback;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::model::{Catalog, Router, UiState};
use crate::search::SearchFacade;

/// Services that exist only once the session is authenticated
pub(crate) struct Services<C> {
    pub(crate) catalog: Arc<C>,
    pub(crate) search: SearchFacade<C>,
}

pub struct AppController<C> {
    pub(crate) ui: Arc<Mutex<UiState>>,
    pub(crate) router: Router,
    pub(crate) services: Arc<RwLock<Option<Services<C>>>>,
    search_debounce: Duration,
    search_limit: u32,
}

impl<C> Clone for AppController<C> {
    fn clone(&self) -> Self {
        Self {
            ui: self.ui.clone(),
            router: self.router.clone(),
            services: self.services.clone(),
            search_debounce: self.search_debounce,
            search_limit: self.search_limit,
        }
    }
}

impl<C: Catalog> AppController<C> {
    pub fn new(router: Router, search_debounce: Duration, search_limit: u32) -> Self {
        Self {
            ui: Arc::new(Mutex::new(UiState::default())),
            router,
            services: Arc::new(RwLock::new(None)),
            search_debounce,
            search_limit,
        }
    }

    /// Wire up the catalog once the session has a credential. Input typed
    /// before that point is searched right away through the debounce.
    pub async fn attach_catalog(&self, catalog: C) {
        let catalog = Arc::new(catalog);
        let search = SearchFacade::new(catalog.clone(), self.search_debounce, self.search_limit);

        let ui = self.ui.lock().await;
        search.set_filters(ui.filters());
        if !ui.query.is_empty() {
            search.on_input(ui.query.clone());
        }
        drop(ui);

        *self.services.write().await = Some(Services { catalog, search });
        tracing::info!("Catalog attached");
    }

    pub async fn is_connected(&self) -> bool {
        self.services.read().await.is_some()
    }

    pub async fn search(&self) -> Option<SearchFacade<C>> {
        self.services.read().await.as_ref().map(|s| s.search.clone())
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.ui.lock().await.should_quit
    }

    pub async fn set_status(&self, message: impl Into<String>) {
        self.ui.lock().await.status_message = Some(message.into());
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        if error_str.contains("404") {
            "Not found in the catalog.".to_string()
        } else if error_str.contains("401") {
            "Credential rejected. Clear storage and restart.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::model::fake::FakeCatalog;
    use anyhow::anyhow;

    #[tokio::test(start_paused = true)]
    async fn query_typed_before_connecting_is_searched_after_attach() {
        let controller: AppController<FakeCatalog> = AppController::new(Router::new(), DEBOUNCE, 10);
        controller.ui.lock().await.query = "early".to_string();
        assert!(!controller.is_connected().await);

        controller.attach_catalog(FakeCatalog::default()).await;
        let search = controller.search().await.unwrap();
        let mut rx = search.subscribe();
        rx.wait_for(|s| s.results.is_some()).await.unwrap();

        assert_eq!(search.query(), "early");
    }

    #[tokio::test]
    async fn connected_controller_exposes_search() {
        let controller = connected(FakeCatalog::default()).await;
        assert!(controller.is_connected().await);
        assert!(controller.search().await.is_some());
    }

    #[test]
    fn errors_are_mapped_to_readable_messages() {
        let msg = AppController::<FakeCatalog>::format_error(&anyhow!("HTTP 404 Not Found"));
        assert_eq!(msg, "Not found in the catalog.");
        let msg = AppController::<FakeCatalog>::format_error(&anyhow!("boom"));
        assert_eq!(msg, "Error: boom");
    }
}
