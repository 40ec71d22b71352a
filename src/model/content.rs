//! Catalog projections: search results, queue tracks and artist details

use super::types::{SearchFilter, SearchResultSection};
use crate::config::DEFAULT_SEARCH_LIMIT;

/// Parameters of one catalog search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub filters: Vec<SearchFilter>,
    pub limit: u32,
    /// Include externally hosted audio content
    pub include_external: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilter::ALL.to_vec(),
            limit: DEFAULT_SEARCH_LIMIT,
            include_external: true,
        }
    }

    pub fn with_filters(mut self, filters: Vec<SearchFilter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// A track from search results, artist top tracks or the queue
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u32,
    /// 30 second preview handed to the external player, when the catalog has one
    pub preview_url: Option<String>,
    pub image_url: Option<String>,
}

impl Track {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// An album from search results or an artist's discography
#[derive(Clone, Debug, PartialEq)]
pub struct SearchAlbum {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub year: String,
    pub image_url: Option<String>,
}

/// An artist from search results
#[derive(Clone, Debug, PartialEq)]
pub struct SearchArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub followers: u32,
    pub image_url: Option<String>,
}

/// A playlist from search results
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPlaylist {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub total_tracks: u32,
}

/// Search results grouped by category. Groups that were filtered out or
/// came back empty are empty vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub tracks: Vec<Track>,
    pub artists: Vec<SearchArtist>,
    pub albums: Vec<SearchAlbum>,
    pub playlists: Vec<SearchPlaylist>,
}

impl SearchResults {
    pub fn len_of(&self, section: SearchResultSection) -> usize {
        match section {
            SearchResultSection::Tracks => self.tracks.len(),
            SearchResultSection::Artists => self.artists.len(),
            SearchResultSection::Albums => self.albums.len(),
            SearchResultSection::Playlists => self.playlists.len(),
        }
    }
}

/// Artist page data
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistDetail {
    pub artist: SearchArtist,
    pub top_tracks: Vec<Track>,
    pub albums: Vec<SearchAlbum>,
}
