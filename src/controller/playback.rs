//! Playback control methods
//!
//! Every command goes through the store provided to the calling task, so these
//! must run inside `PlaybackStore::provide`.

use anyhow::Result;
use std::time::Duration;

use crate::model::{use_playback, Catalog, PlayerProgress, Track};

use super::AppController;

const VOLUME_STEP: i16 = 5;

impl<C: Catalog> AppController<C> {
    /// Append to the queue. The first track of an empty queue starts playing.
    pub async fn add_to_queue(&self, track: Track) -> Result<()> {
        let store = use_playback()?;
        let was_empty = store.queue().is_empty();
        let name = track.name.clone();

        store.enqueue(track);
        if was_empty {
            store.modify_player(|player| {
                player.current = 0;
                player.is_playing = true;
                player.reset_position();
            });
        }

        tracing::info!(track = %name, "Queued track");
        self.set_status(format!("Added \"{}\" to the queue", name)).await;
        Ok(())
    }

    /// Drop the current entry; the following track takes its place
    pub async fn remove_current_track(&self) -> Result<()> {
        let store = use_playback()?;
        let current = store.player().current;

        let Some(removed) = store.remove_from_queue(current) else {
            return Ok(());
        };
        let remaining = store.queue().len();
        store.modify_player(|player| {
            player.reset_position();
            if remaining == 0 {
                player.current = 0;
                player.is_playing = false;
            } else if player.current >= remaining {
                player.current = remaining - 1;
            }
        });

        tracing::debug!(track = %removed.name, remaining, "Removed track from queue");
        self.set_status(format!("Removed \"{}\"", removed.name)).await;
        Ok(())
    }

    pub fn toggle_playback(&self) -> Result<()> {
        let store = use_playback()?;
        if store.current_track().is_none() {
            tracing::debug!("Nothing to play");
            return Ok(());
        }
        store.toggle_playing();
        tracing::debug!(is_playing = store.player().is_playing, "Toggled playback");
        Ok(())
    }

    pub fn next_track(&self) -> Result<()> {
        let store = use_playback()?;
        let moved = store.next();
        tracing::debug!(moved, current = store.player().current, "Next track");
        Ok(())
    }

    pub fn previous_track(&self) -> Result<()> {
        let store = use_playback()?;
        let moved = store.previous();
        tracing::debug!(moved, current = store.player().current, "Previous track");
        Ok(())
    }

    pub fn toggle_shuffle(&self) -> Result<()> {
        use_playback()?.toggle_shuffle();
        Ok(())
    }

    pub fn cycle_repeat(&self) -> Result<()> {
        let store = use_playback()?;
        store.cycle_repeat();
        tracing::debug!(repeat = ?store.player().repeat, "Repeat mode changed");
        Ok(())
    }

    pub fn toggle_mute(&self) -> Result<()> {
        use_playback()?.toggle_mute();
        Ok(())
    }

    pub fn toggle_fullscreen(&self) -> Result<()> {
        use_playback()?.toggle_fullscreen();
        Ok(())
    }

    pub fn volume_up(&self) -> Result<()> {
        self.change_volume(VOLUME_STEP)
    }

    pub fn volume_down(&self) -> Result<()> {
        self.change_volume(-VOLUME_STEP)
    }

    fn change_volume(&self, delta: i16) -> Result<()> {
        let store = use_playback()?;
        let volume = (store.player().volume as i16 + delta).clamp(0, 100) as u8;
        store.set_volume(volume);
        Ok(())
    }

    /// Move the simulated play position forward. At the end of a track the
    /// queue advances the same way as `next_track`.
    pub fn advance_clock(&self, elapsed: Duration) -> Result<()> {
        let store = use_playback()?;
        let state = store.snapshot();
        if !state.player.is_playing {
            return Ok(());
        }
        let Some(track) = state.current_track() else {
            store.modify_player(|player| player.is_playing = false);
            return Ok(());
        };

        let length = track.duration_ms as f64 / 1000.0;
        let played_seconds = state.player.played_seconds.unwrap_or(0.0) + elapsed.as_secs_f64();

        if length <= 0.0 || played_seconds >= length {
            tracing::debug!(track = %track.name, "Track finished");
            let before = state.player.current;
            // repeat-one stays on the same index, so restart it by hand
            if store.next() && store.player().current == before {
                store.modify_player(|player| player.reset_position());
            }
            return Ok(());
        }

        store.modify_player(|player| {
            player.apply_progress(PlayerProgress {
                played: played_seconds / length,
                played_seconds,
                loaded: 1.0,
            })
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::fake::{self, FakeCatalog};
    use crate::model::{PlaybackStore, RepeatMode};
    use std::time::Duration;

    #[tokio::test]
    async fn first_queued_track_starts_playing() {
        let store = PlaybackStore::new();
        let controller = connected(FakeCatalog::default()).await;

        store
            .clone()
            .provide(async {
                controller.add_to_queue(fake::track("one")).await.unwrap();
                controller.add_to_queue(fake::track("two")).await.unwrap();
            })
            .await;

        let state = store.snapshot();
        assert_eq!(state.queue.len(), 2);
        assert_eq!(state.player.current, 0);
        assert!(state.player.is_playing);
        assert_eq!(
            controller.get_ui_state().await.status_message.as_deref(),
            Some("Added \"two\" to the queue")
        );
    }

    #[tokio::test]
    async fn commands_outside_the_store_scope_fail() {
        let controller = connected(FakeCatalog::default()).await;

        let err = controller.add_to_queue(fake::track("one")).await.unwrap_err();
        assert!(err.to_string().contains("use_playback"));
        assert!(controller.toggle_playback().is_err());
    }

    #[tokio::test]
    async fn removing_the_last_entry_keeps_current_in_bounds() {
        let store = PlaybackStore::new();
        store.set_queue(vec![fake::track("one"), fake::track("two")]);
        store.set_current(1);
        let controller = connected(FakeCatalog::default()).await;

        store
            .clone()
            .provide(async {
                controller.remove_current_track().await.unwrap();
                assert_eq!(current_in_scope(), 0);
                controller.remove_current_track().await.unwrap();
            })
            .await;

        let state = store.snapshot();
        assert!(state.queue.is_empty());
        assert!(!state.player.is_playing);
    }

    fn current_in_scope() -> usize {
        crate::model::use_playback().unwrap().player().current
    }

    #[tokio::test]
    async fn volume_steps_are_capped() {
        let store = PlaybackStore::new();
        let controller = connected(FakeCatalog::default()).await;

        store.clone().provide_sync(|| {
            controller.volume_up().unwrap();
            assert_eq!(volume_in_scope(), 100);
            for _ in 0..25 {
                controller.volume_down().unwrap();
            }
        });

        assert_eq!(store.player().volume, 0);
    }

    fn volume_in_scope() -> u8 {
        crate::model::use_playback().unwrap().player().volume
    }

    #[tokio::test]
    async fn clock_advances_and_rolls_into_next_track() {
        let store = PlaybackStore::new();
        let mut short = fake::track("short");
        short.duration_ms = 2_000;
        store.set_queue(vec![short, fake::track("next")]);
        store.modify_player(|p| p.is_playing = true);
        let controller = connected(FakeCatalog::default()).await;

        store.clone().provide_sync(|| {
            controller.advance_clock(Duration::from_secs(1)).unwrap();
        });
        let player = store.player();
        assert_eq!(player.played, Some(0.5));
        assert_eq!(player.played_seconds, Some(1.0));

        store.clone().provide_sync(|| {
            controller.advance_clock(Duration::from_secs(1)).unwrap();
        });
        let player = store.player();
        assert_eq!(player.current, 1);
        assert_eq!(player.played, None);
        assert!(player.is_playing);
    }

    #[tokio::test]
    async fn repeat_one_restarts_the_same_track() {
        let store = PlaybackStore::new();
        let mut short = fake::track("short");
        short.duration_ms = 1_000;
        store.set_queue(vec![short]);
        store.modify_player(|p| {
            p.is_playing = true;
            p.repeat = RepeatMode::One;
            p.played_seconds = Some(0.5);
        });
        let controller = connected(FakeCatalog::default()).await;

        store.clone().provide_sync(|| {
            controller.advance_clock(Duration::from_secs(1)).unwrap();
        });

        let player = store.player();
        assert_eq!(player.current, 0);
        assert_eq!(player.played_seconds, None);
        assert!(player.is_playing);
    }

    #[tokio::test]
    async fn flag_commands_toggle_store_flags() {
        let store = PlaybackStore::new();
        store.set_queue(vec![fake::track("one")]);
        let controller = connected(FakeCatalog::default()).await;

        store.clone().provide_sync(|| {
            controller.toggle_playback().unwrap();
            controller.toggle_shuffle().unwrap();
            controller.cycle_repeat().unwrap();
            controller.toggle_mute().unwrap();
            controller.toggle_fullscreen().unwrap();
        });

        let player = store.player();
        assert!(player.is_playing);
        assert!(player.shuffled);
        assert_eq!(player.repeat, RepeatMode::All);
        assert!(player.muted);
        assert!(player.fullscreen);
    }
}
