//! Debounced search over the catalog
//!
//! Input restarts a timer; only when the timer runs out is a request issued.
//! A superseding keystroke cancels the pending timer but never a request that
//! is already in flight. Each request gets a generation number and responses
//! older than the newest applied one are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{Catalog, SearchFilter, SearchQuery, SearchResults};

/// Observable search state for the views
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub results: Option<SearchResults>,
    pub in_flight: usize,
    last_applied: u64,
}

impl SearchState {
    /// No results yet and a request is running
    pub fn is_initial_load(&self) -> bool {
        self.results.is_none() && self.in_flight > 0
    }

    /// Results are shown and a newer request is running
    pub fn is_refetching(&self) -> bool {
        self.results.is_some() && self.in_flight > 0
    }

    pub fn is_loading(&self) -> bool {
        self.is_initial_load() || self.is_refetching()
    }
}

struct Pending {
    query: String,
    filters: Vec<SearchFilter>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every rearm; a timer only fires if its value is still current
    armed: u64,
}

pub struct SearchFacade<C> {
    catalog: Arc<C>,
    debounce: Duration,
    limit: u32,
    pending: Arc<Mutex<Pending>>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl<C> Clone for SearchFacade<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            debounce: self.debounce,
            limit: self.limit,
            pending: self.pending.clone(),
            generation: self.generation.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C: Catalog> SearchFacade<C> {
    pub fn new(catalog: Arc<C>, debounce: Duration, limit: u32) -> Self {
        let (state, _rx) = watch::channel(SearchState::default());
        Self {
            catalog,
            debounce,
            limit,
            pending: Arc::new(Mutex::new(Pending {
                query: String::new(),
                filters: SearchFilter::ALL.to_vec(),
                timer: None,
                armed: 0,
            })),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn query(&self) -> String {
        self.lock_pending().query.clone()
    }

    pub fn filters(&self) -> Vec<SearchFilter> {
        self.lock_pending().filters.clone()
    }

    /// Record new input and restart the debounce timer
    pub fn on_input(&self, query: impl Into<String>) {
        let mut pending = self.lock_pending();
        pending.query = query.into();
        self.rearm(&mut pending);
    }

    /// Change the category filters; like input, this restarts the timer
    pub fn set_filters(&self, filters: Vec<SearchFilter>) {
        let mut pending = self.lock_pending();
        pending.filters = filters;
        self.rearm(&mut pending);
    }

    /// Issue a request for the current input right away. Returns `None` when
    /// the input is empty.
    pub fn refetch(&self) -> Option<JoinHandle<()>> {
        let query = self.pending_query(&self.lock_pending())?;
        Some(self.issue(query))
    }

    /// Undebounced passthrough to the catalog
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        self.catalog.search(query).await
    }

    fn pending_query(&self, pending: &Pending) -> Option<SearchQuery> {
        if pending.query.trim().is_empty() {
            return None;
        }
        Some(
            SearchQuery::new(pending.query.clone())
                .with_filters(pending.filters.clone())
                .with_limit(self.limit),
        )
    }

    fn issue(&self, query: SearchQuery) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.in_flight += 1);
        tracing::debug!(query = %query.query, generation, "Issuing search");

        let catalog = self.catalog.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = catalog.search(&query).await;
            state.send_modify(|state| {
                state.in_flight = state.in_flight.saturating_sub(1);
                match result {
                    Ok(results) if generation > state.last_applied => {
                        state.last_applied = generation;
                        state.results = Some(results);
                    }
                    Ok(_) => {
                        tracing::debug!(query = %query.query, generation, "Discarding stale search response");
                    }
                    Err(e) => {
                        tracing::warn!(query = %query.query, error = %e, "Search failed");
                    }
                }
            });
        })
    }

    fn rearm(&self, pending: &mut Pending) {
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.armed += 1;

        let armed = pending.armed;
        let facade = self.clone();
        let debounce = self.debounce;
        pending.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            facade.fire(armed);
        }));
    }

    /// Timer expiry. An abort cannot stop a timer that already woke and is
    /// waiting for the lock, so a superseded timer checks `armed` instead.
    fn fire(&self, armed: u64) {
        let query = {
            let pending = self.lock_pending();
            if pending.armed != armed {
                tracing::debug!(armed, current = pending.armed, "Skipping superseded search timer");
                return;
            }
            self.pending_query(&pending)
        };
        if let Some(query) = query {
            self.issue(query);
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
