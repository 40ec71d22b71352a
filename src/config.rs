//! Runtime configuration read from the environment (and `.env`, if present)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_KEY";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_SECRET_KEY";
const STORAGE_PATH_VAR: &str = "STRYM_STORAGE_PATH";
const DEBOUNCE_VAR: &str = "STRYM_SEARCH_DEBOUNCE_MS";
const SEARCH_LIMIT_VAR: &str = "STRYM_SEARCH_LIMIT";
const AUTH_BASE_URL_VAR: &str = "STRYM_AUTH_BASE_URL";
const API_BASE_URL_VAR: &str = "STRYM_API_BASE_URL";

const DEFAULT_STORAGE_PATH: &str = ".cache/storage.json";
pub const DEFAULT_DEBOUNCE_MS: u64 = 700;
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Application-level client identifiers for the client-credentials grant.
/// These identify the app, not a user.
#[derive(Clone)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub identity: ClientIdentity,
    pub storage_path: PathBuf,
    pub search_debounce: Duration,
    pub search_limit: u32,
    /// Overrides for the rspotify base URLs; `None` keeps the Spotify defaults.
    pub auth_base_url: Option<String>,
    pub api_base_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment, honouring `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let identity = ClientIdentity {
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
        };

        let storage_path = lookup(STORAGE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let debounce_ms = parse_or(&lookup, DEBOUNCE_VAR, DEFAULT_DEBOUNCE_MS)?;
        let search_limit = parse_or(&lookup, SEARCH_LIMIT_VAR, DEFAULT_SEARCH_LIMIT)?;

        Ok(Self {
            identity,
            storage_path,
            search_debounce: Duration::from_millis(debounce_ms),
            search_limit,
            auth_base_url: lookup(AUTH_BASE_URL_VAR),
            api_base_url: lookup(API_BASE_URL_VAR),
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
