//! Error taxonomy for the token lifecycle and the now-playing request path.
//!
//! Every failure that can cross a module boundary is one of the enums below.
//! Only [`ConfigError`] is fatal, and only at startup; everything else is
//! converted into an HTTP status by the `api` layer or logged and swallowed.

use reqwest::StatusCode;
use thiserror::Error;

/// Startup configuration could not be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("cannot load environment file: {0}")]
    EnvFile(String),
}

/// The token record could not be read from or written to its backing store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token record is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A callback arrived with a state value that does not bind to a login.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsrfStateError {
    #[error("missing state parameter")]
    Missing,
    #[error("unknown or already used state")]
    Unknown,
    #[error("state has expired")]
    Expired,
}

/// The provider's token endpoint did not hand out a usable token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no refresh token available")]
    NoRefreshToken,
    #[error("token endpoint rejected the grant ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("token endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
    #[error("cannot build authorization url: {0}")]
    InvalidUrl(String),
}

impl AuthError {
    /// True when the provider answered and refused the grant, as opposed to
    /// the request never completing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::Rejected { status, .. } if status.is_client_error())
            || matches!(self, AuthError::NoRefreshToken)
    }
}

/// Failure of the authenticated now-playing request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("not authenticated, log in first")]
    Unauthenticated,
    #[error("access token rejected and could not be refreshed: {0}")]
    Unauthorized(String),
    #[error("rate limited by upstream, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("upstream request failed ({}): {message}", display_status(.status))]
    Failure {
        status: Option<StatusCode>,
        message: String,
    },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Failure {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

fn display_status(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "no status".to_string(),
    }
}
