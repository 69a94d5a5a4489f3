//! Configuration management for the now-playing service.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory (`nowplaying/.env`) or the working
//! directory. Everything is read and validated once at startup into a
//! [`Config`]; a missing required key is reported together with every other
//! missing key so a fresh deployment can be fixed in one pass.
//!
//! Required keys:
//! - `SPOTIFY_API_AUTH_CLIENT_ID`
//! - `SPOTIFY_API_AUTH_CLIENT_SECRET`
//! - `SPOTIFY_API_REDIRECT_URI`
//! - `TOKEN_STORE_PATH`

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

pub const DEFAULT_SCOPE: &str = "user-read-currently-playing user-read-playback-state";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";

/// Log directives used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "nowplaying=info";

/// `RUST_LOG` if it parses, [`DEFAULT_LOG_FILTER`] otherwise.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. Events go to stderr so command output on
/// stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Loads environment variables from `.env` files.
///
/// Looks in the platform-specific local data directory first
/// (`~/.local/share/nowplaying/.env` on Linux), creating the directory if
/// needed, then in the working directory. Both files are optional; a file
/// that exists but cannot be parsed is an error. Variables already present in
/// the process environment are never overwritten.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

/// Directory holding the `.env` file.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("nowplaying");
    path
}

/// How `/callback` answers once the login went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// 302 to the `returnTo` target bound to the state.
    #[default]
    Redirect,
    /// HTML page that posts a message to `window.opener` and closes itself.
    Popup,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(ResponseMode::Redirect),
            "popup" | "popup-postmessage" => Ok(ResponseMode::Popup),
            other => Err(format!("expected `redirect` or `popup`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub api_url: Url,
    pub token_store_path: PathBuf,
    pub server_addr: SocketAddr,
    pub response_mode: ResponseMode,
    pub popup_origin: String,
    pub default_return_to: String,
    pub state_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| match get(key) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let client_id = required("SPOTIFY_API_AUTH_CLIENT_ID");
        let client_secret = required("SPOTIFY_API_AUTH_CLIENT_SECRET");
        let redirect_uri = required("SPOTIFY_API_REDIRECT_URI");
        let token_store_path = required("TOKEN_STORE_PATH");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let parse_url = |key: &'static str, default: &str| {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        };

        Url::parse(&redirect_uri).map_err(|e| ConfigError::Invalid {
            key: "SPOTIFY_API_REDIRECT_URI",
            reason: e.to_string(),
        })?;

        let server_addr = get("SERVER_ADDRESS")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "SERVER_ADDRESS",
                reason: e.to_string(),
            })?;

        let response_mode = match get("CALLBACK_RESPONSE_MODE") {
            Some(raw) => raw
                .parse::<ResponseMode>()
                .map_err(|reason| ConfigError::Invalid {
                    key: "CALLBACK_RESPONSE_MODE",
                    reason,
                })?,
            None => ResponseMode::default(),
        };

        let state_ttl = match get("STATE_TTL_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: "STATE_TTL_SECS",
                    reason: e.to_string(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            auth_url: parse_url("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)?,
            token_url: parse_url("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)?,
            api_url: parse_url("SPOTIFY_API_URL", DEFAULT_API_URL)?,
            token_store_path: PathBuf::from(token_store_path),
            server_addr,
            response_mode,
            popup_origin: get("CALLBACK_POPUP_ORIGIN").unwrap_or_else(|| "*".to_string()),
            default_return_to: get("DEFAULT_RETURN_TO").unwrap_or_else(|| "/".to_string()),
            state_ttl,
        })
    }

    /// Endpoint of the now-playing request.
    pub fn currently_playing_url(&self) -> String {
        format!(
            "{}/me/player/currently-playing",
            self.api_url.as_str().trim_end_matches('/')
        )
    }
}
