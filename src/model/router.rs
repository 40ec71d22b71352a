//! Current-view routing with a back stack

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::types::Route;

/// Cloneable handle to the route shown in the main area
#[derive(Clone)]
pub struct Router {
    current: Arc<watch::Sender<Route>>,
    history: Arc<Mutex<Vec<Route>>>,
}

impl Router {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Route::default());
        Self {
            current: Arc::new(tx),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route.clone());
        if previous != route {
            tracing::debug!(from = ?previous, to = ?route, "Navigating");
            self.history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(previous);
        }
    }

    /// Return to the previous route. The connection-error view has no way
    /// back; it only clears with a restart.
    pub fn back(&self) -> bool {
        if self.current() == Route::ConnectionError {
            return false;
        }
        let previous = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();
        match previous {
            Some(route) => {
                self.current.send_replace(route);
                true
            }
            None => false,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
