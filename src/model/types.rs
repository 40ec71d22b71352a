//! Core type definitions for the application

use rspotify::model::SearchType;

use super::content::ArtistDetail;

/// Repeat mode. A single enum so "repeat all" and "repeat one" can never both
/// be active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Repeat: Off",
            RepeatMode::All => "Repeat: All",
            RepeatMode::One => "Repeat: One",
        }
    }
}

/// A catalog category a search can be restricted to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchFilter {
    Track,
    Artist,
    Album,
    Playlist,
}

impl SearchFilter {
    pub const ALL: [SearchFilter; 4] = [
        SearchFilter::Track,
        SearchFilter::Artist,
        SearchFilter::Album,
        SearchFilter::Playlist,
    ];

    /// Value used in the `type` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            SearchFilter::Track => "track",
            SearchFilter::Artist => "artist",
            SearchFilter::Album => "album",
            SearchFilter::Playlist => "playlist",
        }
    }

    pub fn search_type(self) -> SearchType {
        match self {
            SearchFilter::Track => SearchType::Track,
            SearchFilter::Artist => SearchType::Artist,
            SearchFilter::Album => SearchType::Album,
            SearchFilter::Playlist => SearchType::Playlist,
        }
    }

    pub fn section(self) -> SearchResultSection {
        match self {
            SearchFilter::Track => SearchResultSection::Tracks,
            SearchFilter::Artist => SearchResultSection::Artists,
            SearchFilter::Album => SearchResultSection::Albums,
            SearchFilter::Playlist => SearchResultSection::Playlists,
        }
    }
}

/// Comma-joined filter list, e.g. `track,artist`
pub fn join_filters(filters: &[SearchFilter]) -> String {
    filters
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Which section of search results is selected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchResultSection {
    #[default]
    Tracks,
    Artists,
    Albums,
    Playlists,
}

impl SearchResultSection {
    pub fn next(self) -> Self {
        match self {
            Self::Tracks => Self::Artists,
            Self::Artists => Self::Albums,
            Self::Albums => Self::Playlists,
            Self::Playlists => Self::Tracks,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Tracks => Self::Playlists,
            Self::Artists => Self::Tracks,
            Self::Albums => Self::Artists,
            Self::Playlists => Self::Albums,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Tracks => "Tracks",
            Self::Artists => "Artists",
            Self::Albums => "Albums",
            Self::Playlists => "Playlists",
        }
    }
}

/// The view currently shown in the main area
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Search,
    Artist { id: String },
    ConnectionError,
}

/// Filter sets cycled through from the search bar
pub const FILTER_PRESETS: [&[SearchFilter]; 5] = [
    &SearchFilter::ALL,
    &[SearchFilter::Track],
    &[SearchFilter::Artist],
    &[SearchFilter::Album],
    &[SearchFilter::Playlist],
];

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub query: String,
    pub filter_preset: usize,
    pub section: SearchResultSection,
    pub selected: usize,
    pub artist: Option<ArtistDetail>,
    pub artist_loading: bool,
    pub artist_selected: usize,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl UiState {
    pub fn filters(&self) -> Vec<SearchFilter> {
        FILTER_PRESETS[self.filter_preset % FILTER_PRESETS.len()].to_vec()
    }

    pub fn next_filter_preset(&mut self) -> Vec<SearchFilter> {
        self.filter_preset = (self.filter_preset + 1) % FILTER_PRESETS.len();
        let filters = self.filters();
        if !filters.iter().any(|f| f.section() == self.section) {
            self.section = filters[0].section();
            self.selected = 0;
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_cycles_through_every_mode() {
        let mut mode = RepeatMode::default();
        let mut seen = vec![mode];
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![RepeatMode::Off, RepeatMode::All, RepeatMode::One, RepeatMode::Off]
        );
    }

    #[test]
    fn filter_presets_wrap_and_follow_section() {
        let mut ui = UiState::default();
        assert_eq!(ui.filters(), SearchFilter::ALL.to_vec());

        assert_eq!(ui.next_filter_preset(), vec![SearchFilter::Track]);
        assert_eq!(ui.section, SearchResultSection::Tracks);

        assert_eq!(ui.next_filter_preset(), vec![SearchFilter::Artist]);
        assert_eq!(ui.section, SearchResultSection::Artists);

        for _ in 0..3 {
            ui.next_filter_preset();
        }
        assert_eq!(ui.filters(), SearchFilter::ALL.to_vec());
    }

    #[test]
    fn filters_join_in_given_order() {
        assert_eq!(join_filters(&SearchFilter::ALL), "track,artist,album,playlist");
        assert_eq!(join_filters(&[SearchFilter::Album]), "album");
    }
}
