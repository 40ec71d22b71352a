//! Playback-related state shared by every view

use super::content::Track;
use super::types::RepeatMode;

pub const DEFAULT_VOLUME_PERCENT: u8 = 100;

/// Player UI state. Position markers stay `None` until an external player
/// attaches and reports them.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub seek: Option<f64>,
    /// Fraction of the current track played, 0.0..=1.0
    pub played: Option<f64>,
    pub played_seconds: Option<f64>,
    /// Fraction of the current track buffered, 0.0..=1.0
    pub loaded: Option<f64>,
    pub is_playing: bool,
    pub shuffled: bool,
    pub repeat: RepeatMode,
    pub fullscreen: bool,
    pub muted: bool,
    /// 0..=100
    pub volume: u8,
    /// Index into the queue. Not checked against the queue length.
    pub current: usize,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            seek: None,
            played: None,
            played_seconds: None,
            loaded: None,
            is_playing: false,
            shuffled: false,
            repeat: RepeatMode::Off,
            fullscreen: false,
            muted: false,
            volume: DEFAULT_VOLUME_PERCENT,
            current: 0,
        }
    }
}

/// Progress reported by an attached player
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerProgress {
    pub played: f64,
    pub played_seconds: f64,
    pub loaded: f64,
}

impl PlayerState {
    pub fn apply_progress(&mut self, progress: PlayerProgress) {
        self.played = Some(progress.played);
        self.played_seconds = Some(progress.played_seconds);
        self.loaded = Some(progress.loaded);
    }

    /// Forget position markers, e.g. when switching tracks
    pub fn reset_position(&mut self) {
        self.seek = None;
        self.played = None;
        self.played_seconds = None;
        self.loaded = None;
    }

    /// Index that follows `current` in a queue of `len` tracks, honouring the
    /// repeat mode. `None` means playback ends.
    ///
    /// `current` may lie outside the queue; repeat-all wraps it back in.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self.repeat {
            RepeatMode::One => Some(self.current),
            RepeatMode::All => Some((self.current % len + 1) % len),
            RepeatMode::Off => self.current.checked_add(1).filter(|next| *next < len),
        }
    }

    pub fn previous_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self.repeat {
            RepeatMode::One => Some(self.current),
            RepeatMode::All => Some((self.current % len + len - 1) % len),
            RepeatMode::Off => self.current.checked_sub(1),
        }
    }
}

/// Snapshot of the whole playback record: queue plus player state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub queue: Vec<Track>,
    pub player: PlayerState,
}

impl PlaybackState {
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.get(self.player.current)
    }
}
