//! Catalog API client wrapper
//!
//! Every call carries the bearer credential acquired by the session manager.

use std::future::Future;
use std::sync::Arc;
use anyhow::{anyhow, Result};
use futures::{StreamExt, TryStreamExt};
use rspotify::{
    model::{
        ArtistId, Country, FullArtist, FullTrack, IncludeExternal, Market, SimplifiedAlbum,
        SimplifiedPlaylist,
    },
    prelude::*,
    ClientCredsSpotify,
};

use crate::auth::Credential;
use crate::config::AppConfig;
use crate::{log_api_request, log_api_result};
use super::content::{
    ArtistDetail, SearchAlbum, SearchArtist, SearchPlaylist, SearchQuery, SearchResults, Track,
};
use super::types::join_filters;

pub const ARTIST_ALBUMS_LIMIT: usize = 10;
const TOP_TRACKS_MARKET: Market = Market::Country(Country::UnitedStates);

/// Read access to the remote catalog
pub trait Catalog: Send + Sync + 'static {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchResults>> + Send;

    fn artist_detail(&self, artist_id: &str) -> impl Future<Output = Result<ArtistDetail>> + Send;
}

/// Spotify catalog client authorized with a client-credentials token
#[derive(Clone)]
pub struct SpotifyClient {
    client: Arc<ClientCredsSpotify>,
}

impl SpotifyClient {
    pub async fn with_credential(credential: &Credential, config: &AppConfig) -> Result<Self> {
        let client = crate::auth::build_rspotify_client(config);
        *client
            .token
            .lock()
            .await
            .map_err(|_| anyhow!("rspotify token lock poisoned"))? = Some(credential.to_rspotify_token());

        tracing::debug!("Catalog client initialized");
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// One catalog request covering every selected category; the `type`
    /// parameter is the comma-joined filter list.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let mut results = SearchResults {
            query: query.query.clone(),
            ..SearchResults::default()
        };
        if query.filters.is_empty() {
            return Ok(results);
        }

        log_api_request!(
            "search",
            q = %query.query,
            types = %join_filters(&query.filters),
            limit = query.limit
        );

        let response = self
            .client
            .search_multiple(
                &query.query,
                query.filters.iter().map(|filter| filter.search_type()),
                None,
                query.include_external.then_some(IncludeExternal::Audio),
                Some(query.limit),
                None,
            )
            .await;
        log_api_result!("search", response);
        let response = response?;

        // Categories missing from the response stay empty
        if let Some(page) = response.tracks {
            results.tracks = page.items.into_iter().map(track_from_full).collect();
        }
        if let Some(page) = response.artists {
            results.artists = page.items.into_iter().map(artist_from_full).collect();
        }
        if let Some(page) = response.albums {
            results.albums = page.items.into_iter().map(album_from_simplified).collect();
        }
        if let Some(page) = response.playlists {
            results.playlists = page.items.into_iter().map(playlist_from_simplified).collect();
        }

        Ok(results)
    }

    pub async fn get_artist_detail(&self, artist_id: &str) -> Result<ArtistDetail> {
        log_api_request!("artist_detail", artist_id);

        let id = ArtistId::from_id(artist_id)?;
        let albums = async {
            self.client
                .artist_albums(id.clone(), None, None)
                .take(ARTIST_ALBUMS_LIMIT)
                .try_collect::<Vec<_>>()
                .await
        };

        let result = futures::try_join!(
            self.client.artist(id.clone()),
            self.client.artist_top_tracks(id.clone(), Some(TOP_TRACKS_MARKET)),
            albums,
        );
        log_api_result!("artist_detail", result);
        let (artist, top_tracks, albums) = result?;

        Ok(ArtistDetail {
            artist: artist_from_full(artist),
            top_tracks: top_tracks.into_iter().map(track_from_full).collect(),
            albums: albums.into_iter().map(album_from_simplified).collect(),
        })
    }
}

impl Catalog for SpotifyClient {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchResults>> + Send {
        SpotifyClient::search(self, query)
    }

    fn artist_detail(&self, artist_id: &str) -> impl Future<Output = Result<ArtistDetail>> + Send {
        self.get_artist_detail(artist_id)
    }
}

fn track_from_full(track: FullTrack) -> Track {
    let id = track.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default();
    Track {
        uri: format!("spotify:track:{}", id),
        id,
        artists: track.artists.iter().map(|a| a.name.clone()).collect(),
        image_url: track.album.images.first().map(|i| i.url.clone()),
        album: track.album.name,
        name: track.name,
        duration_ms: track.duration.num_milliseconds() as u32,
        preview_url: track.preview_url,
    }
}

fn album_from_simplified(album: SimplifiedAlbum) -> SearchAlbum {
    SearchAlbum {
        id: album.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
        artist: album.artists.first().map(|a| a.name.clone()).unwrap_or_default(),
        year: album.release_date.unwrap_or_default().chars().take(4).collect(),
        image_url: album.images.first().map(|i| i.url.clone()),
        name: album.name,
    }
}

fn artist_from_full(artist: FullArtist) -> SearchArtist {
    SearchArtist {
        id: artist.id.id().to_string(),
        image_url: artist.images.first().map(|i| i.url.clone()),
        followers: artist.followers.total,
        name: artist.name,
        genres: artist.genres,
    }
}

fn playlist_from_simplified(playlist: SimplifiedPlaylist) -> SearchPlaylist {
    SearchPlaylist {
        id: playlist.id.id().to_string(),
        owner: playlist
            .owner
            .display_name
            .unwrap_or_else(|| playlist.owner.id.id().to_string()),
        total_tracks: playlist.tracks.total,
        name: playlist.name,
    }
}


#[cfg(test)]
mod tests {
    use super::fake::*;
    use super::*;
    use crate::model::SearchFilter;

    async fn client(server: &CannedServer) -> SpotifyClient {
        SpotifyClient::with_credential(&Credential::new("bearer-abc"), &server.config())
            .await
            .unwrap()
    }

    fn search_response() -> serde_json::Value {
        serde_json::json!({
            "tracks": page_json(vec![track_json("tr1", "Opening", 185_000)]),
            "artists": page_json(vec![artist_json("ar1", "The Band", 1234)]),
            "albums": page_json(vec![album_json("al2", "Second Record", "2004")]),
            "playlists": page_json(vec![
                playlist_json("pl1", "Mix", Some("Curator")),
                playlist_json("pl2", "Unnamed", None),
            ]),
        })
    }

    #[tokio::test]
    async fn search_sends_one_request_with_joined_types() {
        let server = CannedServer::start(vec![("/search", 200, search_response())]).await;
        let query = SearchQuery::new("ab");

        client(&server).await.search(&query).await.unwrap();

        let lines = server.request_lines();
        assert_eq!(lines.len(), 1, "requests: {lines:?}");
        let line = lines[0].replace("%2C", ",");
        assert!(line.starts_with("GET /search?"), "{line}");
        assert!(line.contains(&format!("type={}", join_filters(&query.filters))), "{line}");
        assert!(line.contains("q=ab"), "{line}");
        assert!(line.contains("limit=10"), "{line}");
        assert!(line.contains("include_external=audio"), "{line}");

        let request = server.requests()[0].to_ascii_lowercase();
        assert!(request.contains("authorization: bearer bearer-abc"));
    }

    #[tokio::test]
    async fn search_maps_every_category() {
        let server = CannedServer::start(vec![("/search", 200, search_response())]).await;

        let results = client(&server).await.search(&SearchQuery::new("ab")).await.unwrap();

        assert_eq!(results.query, "ab");
        let track = &results.tracks[0];
        assert_eq!(track.id, "tr1");
        assert_eq!(track.uri, "spotify:track:tr1");
        assert_eq!(track.name, "Opening");
        assert_eq!(track.artists, vec!["The Band".to_string(), "Guest".to_string()]);
        assert_eq!(track.album, "First Record");
        assert_eq!(track.duration_ms, 185_000);
        assert_eq!(track.image_url.as_deref(), Some("https://img.test/al1.jpg"));

        let artist = &results.artists[0];
        assert_eq!((artist.id.as_str(), artist.name.as_str()), ("ar1", "The Band"));
        assert_eq!(artist.followers, 1234);
        assert_eq!(artist.genres, vec!["shoegaze".to_string()]);

        let album = &results.albums[0];
        assert_eq!(album.id, "al2");
        assert_eq!(album.artist, "The Band");
        assert_eq!(album.year, "2004");

        assert_eq!(results.playlists[0].owner, "Curator");
        assert_eq!(results.playlists[0].total_tracks, 42);
        // Owner without a display name falls back to the user id
        assert_eq!(results.playlists[1].owner, "curator");
    }

    #[tokio::test]
    async fn categories_missing_from_the_response_stay_empty() {
        let response = serde_json::json!({
            "tracks": page_json(vec![track_json("tr1", "Opening", 1000)]),
        });
        let server = CannedServer::start(vec![("/search", 200, response)]).await;
        let query = SearchQuery::new("ab").with_filters(vec![SearchFilter::Track, SearchFilter::Album]);

        let results = client(&server).await.search(&query).await.unwrap();

        assert_eq!(results.tracks.len(), 1);
        assert!(results.albums.is_empty());
        assert!(results.artists.is_empty());
        assert_eq!(server.request_lines().len(), 1);
    }

    #[tokio::test]
    async fn failed_search_is_an_error() {
        let server =
            CannedServer::start(vec![("/search", 500, serde_json::json!({ "error": "boom" }))]).await;

        let result = client(&server).await.search(&SearchQuery::new("ab")).await;

        assert!(result.is_err());
        assert_eq!(server.request_lines().len(), 1);
    }

    #[tokio::test]
    async fn search_without_filters_sends_nothing() {
        let server = CannedServer::start(vec![]).await;
        let query = SearchQuery::new("ab").with_filters(vec![]);

        let results = client(&server).await.search(&query).await.unwrap();

        assert_eq!(results, SearchResults { query: "ab".into(), ..SearchResults::default() });
        assert!(server.request_lines().is_empty());
    }

    #[tokio::test]
    async fn artist_detail_combines_three_requests() {
        let server = CannedServer::start(vec![
            ("/artists/ar1", 200, artist_json("ar1", "The Band", 7)),
            (
                "/artists/ar1/top-tracks",
                200,
                serde_json::json!({ "tracks": [track_json("tr1", "Opening", 1000), track_json("tr2", "Closer", 2000)] }),
            ),
            (
                "/artists/ar1/albums",
                200,
                page_json(vec![album_json("al1", "First Record", "1999-04-01")]),
            ),
        ])
        .await;

        let detail = client(&server).await.get_artist_detail("ar1").await.unwrap();

        assert_eq!(detail.artist.name, "The Band");
        assert_eq!(detail.artist.followers, 7);
        let names: Vec<_> = detail.top_tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Opening", "Closer"]);
        assert_eq!(detail.albums[0].year, "1999");

        let lines = server.request_lines();
        assert!(lines.iter().any(|l| l.contains("/top-tracks?market=US")), "{lines:?}");
    }

    #[tokio::test]
    async fn artist_detail_fails_when_any_part_fails() {
        let server = CannedServer::start(vec![
            ("/artists/ar1", 200, artist_json("ar1", "The Band", 7)),
            ("/artists/ar1/top-tracks", 404, serde_json::json!({ "error": "missing" })),
            ("/artists/ar1/albums", 200, page_json(vec![])),
        ])
        .await;

        assert!(client(&server).await.get_artist_detail("ar1").await.is_err());
    }
}
