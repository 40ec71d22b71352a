//! Model module - Application state and data types
//!
//! - `types`: Core type definitions (repeat mode, search filters, routes)
//! - `playback`: Player state and the playback record
//! - `content`: Catalog projections (tracks, artists, albums, playlists)
//! - `store`: Shared playback store and its scoped accessor
//! - `router`: Current view with back stack
//! - `spotify_client`: Catalog API client wrapper

mod types;
mod playback;
mod content;
mod store;
mod router;
mod spotify_client;

pub use types::{join_filters, RepeatMode, Route, SearchFilter, SearchResultSection, UiState};

pub use playback::{PlaybackState, PlayerProgress, PlayerState, DEFAULT_VOLUME_PERCENT};

pub use content::{
    ArtistDetail, SearchAlbum, SearchArtist, SearchPlaylist, SearchQuery, SearchResults, Track,
};

pub use store::{use_playback, ContextError, PlaybackStore};

pub use router::Router;

pub use spotify_client::{Catalog, SpotifyClient};

#[cfg(test)]
pub(crate) use spotify_client::fake;
