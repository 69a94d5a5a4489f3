//! # API Module
//!
//! HTTP endpoints of the service. Each handler is a thin adapter over the
//! `management` and `spotify` modules:
//!
//! - [`login`] - `GET /login?returnTo=..` creates a CSRF state and redirects
//!   to the Spotify authorization page.
//! - [`callback`] - `GET /callback?code=..&state=..` consumes the state,
//!   exchanges the code and either redirects to `returnTo` or serves the
//!   popup page, depending on [`ResponseMode`].
//! - [`current`] - `GET /current` returns the normalized now-playing view.
//! - [`health`] - `GET /health` reports liveness and whether a token is held.
//!
//! Handlers receive the shared [`AppState`] through an `Extension` layer.

mod callback;
mod current;
mod health;
mod login;

use std::sync::Arc;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    config::{Config, ResponseMode},
    error::{AuthError, CsrfStateError, UpstreamError},
    management::{Session, StateRegistry},
    spotify::{SpotifyAuth, SpotifyPlayer},
};

pub use callback::callback;
pub use current::current;
pub use health::health;
pub use login::login;

/// How `/callback` finishes a login.
#[derive(Debug, Clone)]
pub struct CallbackOptions {
    pub mode: ResponseMode,
    pub popup_origin: String,
    pub default_return_to: String,
}

impl CallbackOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.response_mode,
            popup_origin: config.popup_origin.clone(),
            default_return_to: config.default_return_to.clone(),
        }
    }
}

/// Everything the handlers share.
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub states: Arc<StateRegistry>,
    pub auth: Arc<SpotifyAuth>,
    pub player: Arc<SpotifyPlayer>,
    pub callback: CallbackOptions,
}

impl AppState {
    pub fn new(config: &Config, session: Session) -> Self {
        let auth = Arc::new(SpotifyAuth::new(config, session.clone()));
        let player = Arc::new(SpotifyPlayer::new(config, Arc::clone(&auth)));
        Self {
            session,
            states: Arc::new(StateRegistry::with_ttl(config.state_ttl)),
            auth,
            player,
            callback: CallbackOptions::from_config(config),
        }
    }
}

/// Failure of a request, rendered as `{"error": ..}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Csrf(CsrfStateError),
    Auth(AuthError),
    Upstream(UpstreamError),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Csrf(CsrfStateError::Missing) => StatusCode::BAD_REQUEST,
            ApiError::Csrf(_) => StatusCode::FORBIDDEN,
            ApiError::Auth(e) if e.is_rejection() => StatusCode::UNAUTHORIZED,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(UpstreamError::Unauthenticated)
            | ApiError::Upstream(UpstreamError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(UpstreamError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(UpstreamError::Failure { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Csrf(e) => e.to_string(),
            ApiError::Auth(e) => e.to_string(),
            ApiError::Upstream(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl From<CsrfStateError> for ApiError {
    fn from(err: CsrfStateError) -> Self {
        ApiError::Csrf(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response =
            (self.status(), Json(json!({ "error": self.message() }))).into_response();

        if let ApiError::Upstream(UpstreamError::RateLimited { retry_after }) = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// 302 to `location`.
pub(crate) fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => ApiError::BadRequest("invalid redirect target".into()).into_response(),
    }
}
