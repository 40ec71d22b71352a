//! Shared playback store
//!
//! One mutable record (queue + player state) handed to every view. Writes are
//! last-write-wins and are not validated: callers keep `current` inside the
//! queue bounds themselves.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use super::content::Track;
use super::playback::{PlaybackState, PlayerState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("{accessor} must be called within a {provider} scope")]
    OutsideProvider {
        accessor: &'static str,
        provider: &'static str,
    },
}

tokio::task_local! {
    static PLAYBACK: PlaybackStore;
}

/// Cloneable handle to the shared playback record
#[derive(Clone)]
pub struct PlaybackStore {
    state: Arc<watch::Sender<PlaybackState>>,
}

impl PlaybackStore {
    pub fn new() -> Self {
        Self::with_state(PlaybackState::default())
    }

    pub fn with_state(state: PlaybackState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { state: Arc::new(tx) }
    }

    /// Run `fut` with this store available through [`use_playback`].
    ///
    /// Tasks spawned from inside the scope do not inherit it.
    pub async fn provide<F: Future>(self, fut: F) -> F::Output {
        PLAYBACK.scope(self, fut).await
    }

    pub fn provide_sync<R>(self, f: impl FnOnce() -> R) -> R {
        PLAYBACK.sync_scope(self, f)
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    // ========================================================================
    // Whole record
    // ========================================================================

    pub fn snapshot(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn set(&self, state: PlaybackState) {
        self.state.send_replace(state);
    }

    /// Replace the record with a function of the previous value
    pub fn update(&self, f: impl FnOnce(&PlaybackState) -> PlaybackState) {
        self.state.send_modify(|state| *state = f(state));
    }

    // ========================================================================
    // Queue only
    // ========================================================================

    pub fn queue(&self) -> Vec<Track> {
        self.state.borrow().queue.clone()
    }

    pub fn set_queue(&self, queue: Vec<Track>) {
        self.state.send_modify(|state| state.queue = queue);
    }

    pub fn update_queue(&self, f: impl FnOnce(&[Track]) -> Vec<Track>) {
        self.state.send_modify(|state| state.queue = f(&state.queue));
    }

    pub fn enqueue(&self, track: Track) {
        tracing::debug!(track = %track.name, "Adding track to queue");
        self.state.send_modify(|state| state.queue.push(track));
    }

    pub fn remove_from_queue(&self, index: usize) -> Option<Track> {
        let mut removed = None;
        self.state.send_modify(|state| {
            if index < state.queue.len() {
                removed = Some(state.queue.remove(index));
            }
        });
        removed
    }

    // ========================================================================
    // Player state only
    // ========================================================================

    pub fn player(&self) -> PlayerState {
        self.state.borrow().player.clone()
    }

    pub fn set_player(&self, player: PlayerState) {
        self.state.send_modify(|state| state.player = player);
    }

    pub fn update_player(&self, f: impl FnOnce(&PlayerState) -> PlayerState) {
        self.state.send_modify(|state| state.player = f(&state.player));
    }

    pub fn modify_player(&self, f: impl FnOnce(&mut PlayerState)) {
        self.state.send_modify(|state| f(&mut state.player));
    }

    pub fn set_current(&self, current: usize) {
        self.modify_player(|player| player.current = current);
    }

    pub fn set_volume(&self, volume: u8) {
        self.modify_player(|player| player.volume = volume);
    }

    pub fn toggle_playing(&self) {
        self.modify_player(|player| player.is_playing = !player.is_playing);
    }

    pub fn toggle_shuffle(&self) {
        self.modify_player(|player| player.shuffled = !player.shuffled);
    }

    pub fn cycle_repeat(&self) {
        self.modify_player(|player| player.repeat = player.repeat.next());
    }

    pub fn toggle_mute(&self) {
        self.modify_player(|player| player.muted = !player.muted);
    }

    pub fn toggle_fullscreen(&self) {
        self.modify_player(|player| player.fullscreen = !player.fullscreen);
    }

    /// Advance to the next queue entry. Returns false when playback ends.
    pub fn next(&self) -> bool {
        self.step(PlayerState::next_index)
    }

    pub fn previous(&self) -> bool {
        self.step(PlayerState::previous_index)
    }

    fn step(&self, pick: fn(&PlayerState, usize) -> Option<usize>) -> bool {
        let mut moved = false;
        self.state.send_modify(|state| {
            match pick(&state.player, state.queue.len()) {
                Some(index) => {
                    if index != state.player.current {
                        state.player.reset_position();
                    }
                    state.player.current = index;
                    moved = true;
                }
                None => state.player.is_playing = false,
            }
        });
        moved
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.borrow().current_track().cloned()
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The store provided to the current task.
pub fn use_playback() -> Result<PlaybackStore, ContextError> {
    PLAYBACK
        .try_with(|store| store.clone())
        .map_err(|_| ContextError::OutsideProvider {
            accessor: "use_playback",
            provider: "PlaybackStore::provide",
        })
}
