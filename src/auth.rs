//! Session management for the client-credentials grant
//!
//! The session holds at most one bearer credential. It is read from durable
//! storage at startup; when absent, a single token exchange is attempted per
//! process. Success is announced on the status channel, failure sends the
//! router to the connection-error view and is final.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};

use rspotify::{ClientCredsSpotify, Config, Credentials, Token};

use crate::config::AppConfig;
use crate::model::{Route, Router};
use crate::storage::{KeyValueStorage, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("token endpoint returned no access token")]
    MissingToken,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("session already failed: {0}")]
    SessionFailed(String),
}

/// Opaque bearer token authorizing catalog calls
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rspotify_token(&self) -> Token {
        Token {
            access_token: self.0.clone(),
            expires_in: chrono::Duration::seconds(3600),
            expires_at: None,
            scopes: HashSet::new(),
            refresh_token: None,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed(String),
}

/// Exchanges the application identity for a bearer credential
pub trait TokenExchange: Send + Sync + 'static {
    fn exchange(&self) -> impl Future<Output = Result<Credential, AuthError>> + Send;
}

pub fn build_rspotify_client(config: &AppConfig) -> ClientCredsSpotify {
    let creds = Credentials::new(&config.identity.client_id, &config.identity.client_secret);

    let mut rspotify_config = Config {
        token_cached: false,
        token_refreshing: false,
        ..Default::default()
    };
    if let Some(url) = &config.auth_base_url {
        rspotify_config.auth_base_url = url.clone();
    }
    if let Some(url) = &config.api_base_url {
        rspotify_config.api_base_url = url.clone();
    }

    ClientCredsSpotify::with_config(creds, rspotify_config)
}

/// Token exchange against the Spotify accounts service.
///
/// Posts `grant_type=client_credentials` to `api/token`. rspotify sends the
/// client id and secret as an HTTP basic `Authorization` header rather than
/// as `client_id`/`client_secret` form fields; the accounts service accepts
/// either.
pub struct SpotifyTokenExchange {
    config: AppConfig,
}

impl SpotifyTokenExchange {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl TokenExchange for SpotifyTokenExchange {
    async fn exchange(&self) -> Result<Credential, AuthError> {
        let client = build_rspotify_client(&self.config);

        client
            .request_token()
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let token = client
            .token
            .lock()
            .await
            .map_err(|_| AuthError::ExchangeFailed("rspotify token lock poisoned".to_string()))?
            .as_ref()
            .map(|t| t.access_token.clone())
            .filter(|t| !t.is_empty());

        token.map(Credential::new).ok_or(AuthError::MissingToken)
    }
}

pub struct SessionManager<S, X> {
    storage: Arc<S>,
    exchange: X,
    router: Router,
    credential: RwLock<Option<Credential>>,
    status: watch::Sender<SessionStatus>,
    attempt: Mutex<()>,
}

impl<S, X> SessionManager<S, X>
where
    S: KeyValueStorage,
    X: TokenExchange,
{
    /// Create the session, picking up a credential left in storage.
    pub fn new(storage: Arc<S>, exchange: X, router: Router) -> Result<Self, AuthError> {
        let stored = storage
            .get(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(Credential::new);

        let status = if stored.is_some() {
            tracing::info!("Found stored credential");
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        };
        let (status, _rx) = watch::channel(status);

        Ok(Self {
            storage,
            exchange,
            router,
            credential: RwLock::new(stored),
            status,
            attempt: Mutex::new(()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        *self.status.borrow() == SessionStatus::Authenticated
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Make sure a credential is live, exchanging for one if needed.
    ///
    /// Concurrent callers share a single exchange. After a failed exchange
    /// every call returns [`AuthError::SessionFailed`] without a new request.
    pub async fn ensure_authenticated(&self) -> Result<Credential, AuthError> {
        let _attempt = self.attempt.lock().await;

        match self.status() {
            SessionStatus::Authenticated => {
                if let Some(credential) = self.credential().await {
                    return Ok(credential);
                }
            }
            SessionStatus::Failed(reason) => return Err(AuthError::SessionFailed(reason)),
            SessionStatus::Unauthenticated | SessionStatus::Authenticating => {}
        }

        self.status.send_replace(SessionStatus::Authenticating);
        tracing::info!("No credential available, requesting client-credentials token");

        match self.acquire().await {
            Ok(credential) => {
                *self.credential.write().await = Some(credential.clone());
                self.status.send_replace(SessionStatus::Authenticated);
                tracing::info!("Session authenticated");
                Ok(credential)
            }
            Err(e) => {
                tracing::error!(error = %e, "Authentication failed");
                self.router.navigate(Route::ConnectionError);
                self.status.send_replace(SessionStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn acquire(&self) -> Result<Credential, AuthError> {
        let credential = self.exchange.exchange().await?;
        self.storage.set(ACCESS_TOKEN_KEY, credential.as_str())?;
        tracing::debug!("Saved credential to storage");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fake::CannedServer;
    use crate::storage::memory::MemoryStorage;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    struct FakeExchange {
        calls: Arc<AtomicUsize>,
        response: Result<&'static str, u16>,
    }

    impl FakeExchange {
        fn ok(token: &'static str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                response: Ok(token),
            }
        }

        fn http_error(status: u16) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                response: Err(status),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenExchange for FakeExchange {
        async fn exchange(&self) -> Result<Credential, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            match self.response {
                Ok(token) => Ok(Credential::new(token)),
                Err(status) => Err(AuthError::ExchangeFailed(format!("HTTP {status}"))),
            }
        }
    }

    fn session(
        storage: &MemoryStorage,
        exchange: &FakeExchange,
        router: &Router,
    ) -> SessionManager<MemoryStorage, FakeExchange> {
        SessionManager::new(Arc::new(storage.clone()), exchange.clone(), router.clone()).unwrap()
    }

    #[tokio::test]
    async fn stored_credential_skips_the_exchange() {
        let storage = MemoryStorage::with_entry(ACCESS_TOKEN_KEY, "stored");
        let exchange = FakeExchange::ok("fresh");
        let session = session(&storage, &exchange, &Router::new());

        assert!(session.is_authenticated());
        let credential = session.ensure_authenticated().await.unwrap();

        assert_eq!(credential.as_str(), "stored");
        assert_eq!(exchange.calls(), 0);
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_triggers_exactly_one_exchange() {
        let storage = MemoryStorage::default();
        let exchange = FakeExchange::ok("abc");
        let session = session(&storage, &exchange, &Router::new());

        assert!(!session.is_authenticated());
        session.ensure_authenticated().await.unwrap();
        session.ensure_authenticated().await.unwrap();

        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn successful_exchange_persists_and_announces() {
        let storage = MemoryStorage::default();
        let exchange = FakeExchange::ok("abc");
        let router = Router::new();
        let session = session(&storage, &exchange, &router);
        let mut status = session.subscribe();

        session.ensure_authenticated().await.unwrap();

        assert_eq!(
            storage.writes(),
            vec![(ACCESS_TOKEN_KEY.to_string(), "abc".to_string())]
        );
        assert!(session.is_authenticated());
        assert_eq!(*status.borrow_and_update(), SessionStatus::Authenticated);
        assert_eq!(session.credential().await, Some(Credential::new("abc")));
        assert_eq!(router.current(), Route::Search);

        // The next application instance starts authenticated from storage.
        let next_exchange = FakeExchange::ok("other");
        let next = super::SessionManager::new(Arc::new(storage.clone()), next_exchange.clone(), Router::new())
            .unwrap();
        assert!(next.is_authenticated());
        assert_eq!(next.ensure_authenticated().await.unwrap().as_str(), "abc");
        assert_eq!(next_exchange.calls(), 0);
    }

    #[tokio::test]
    async fn failed_exchange_routes_to_connection_error() {
        let storage = MemoryStorage::default();
        let exchange = FakeExchange::http_error(400);
        let router = Router::new();
        let session = session(&storage, &exchange, &router);

        let err = session.ensure_authenticated().await.unwrap_err();

        assert!(matches!(err, AuthError::ExchangeFailed(_)));
        assert_eq!(router.current(), Route::ConnectionError);
        assert!(storage.writes().is_empty());
        assert!(!session.is_authenticated());
        assert!(matches!(session.status(), SessionStatus::Failed(_)));
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let storage = MemoryStorage::default();
        let exchange = FakeExchange::http_error(500);
        let session = session(&storage, &exchange, &Router::new());

        assert!(session.ensure_authenticated().await.is_err());
        let err = session.ensure_authenticated().await.unwrap_err();

        assert!(matches!(err, AuthError::SessionFailed(_)));
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_exchange() {
        let storage = MemoryStorage::default();
        let exchange = FakeExchange::ok("abc");
        let session = session(&storage, &exchange, &Router::new());

        let (a, b) = tokio::join!(session.ensure_authenticated(), session.ensure_authenticated());

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn token_exchange_posts_client_credentials() {
        let server = CannedServer::start(vec![(
            "/api/token",
            200,
            json!({ "access_token": "abc", "token_type": "Bearer", "expires_in": 3600 }),
        )])
        .await;

        let credential = SpotifyTokenExchange::new(server.config()).exchange().await.unwrap();

        assert_eq!(credential.as_str(), "abc");
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let request = requests[0].to_ascii_lowercase();
        assert!(request.starts_with("post /api/token "), "{request}");
        assert!(request.contains("grant_type=client_credentials"), "{request}");
        assert!(request.contains("authorization: basic "), "{request}");
    }

    #[tokio::test]
    async fn token_exchange_reports_http_errors() {
        let server = CannedServer::start(vec![(
            "/api/token",
            400,
            json!({ "error": "invalid_client" }),
        )])
        .await;

        let err = SpotifyTokenExchange::new(server.config()).exchange().await.unwrap_err();

        assert!(matches!(err, AuthError::ExchangeFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn empty_access_token_is_missing() {
        let server = CannedServer::start(vec![(
            "/api/token",
            200,
            json!({ "access_token": "", "token_type": "Bearer", "expires_in": 3600 }),
        )])
        .await;

        let err = SpotifyTokenExchange::new(server.config()).exchange().await.unwrap_err();

        assert!(matches!(err, AuthError::MissingToken), "{err:?}");
    }

    #[tokio::test]
    async fn rejected_exchange_through_the_session_shows_connection_error() {
        let server = CannedServer::start(vec![(
            "/api/token",
            400,
            json!({ "error": "invalid_client" }),
        )])
        .await;
        let storage = MemoryStorage::default();
        let router = Router::new();
        let session = SessionManager::new(
            Arc::new(storage.clone()),
            SpotifyTokenExchange::new(server.config()),
            router.clone(),
        )
        .unwrap();

        assert!(session.ensure_authenticated().await.is_err());
        assert!(session.ensure_authenticated().await.is_err());

        assert_eq!(router.current(), Route::ConnectionError);
        assert!(storage.writes().is_empty());
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn credential_debug_is_redacted() {
        assert!(!format!("{:?}", Credential::new("secret-token")).contains("secret-token"));
    }
}
