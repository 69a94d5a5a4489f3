use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use tokio::time::sleep;

use crate::{
    config::Config,
    error::UpstreamError,
    management::Session,
    spotify::SpotifyAuth,
    types::{CurrentlyPlayingResponse, NowPlaying},
    utils,
};

/// Rate-limit retries allowed within one call.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Longest `Retry-After` we are willing to sit out inside a request.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Treat a token as expired this long before the provider would.
pub const EXPIRY_MARGIN_SECS: i64 = 240;

/// Client for the player endpoints of the Spotify Web API.
pub struct SpotifyPlayer {
    http: Client,
    currently_playing_url: String,
    session: Session,
    auth: Arc<SpotifyAuth>,
}

impl SpotifyPlayer {
    pub fn new(config: &Config, auth: Arc<SpotifyAuth>) -> Self {
        Self::with_client(Client::new(), config, auth)
    }

    pub fn with_client(http: Client, config: &Config, auth: Arc<SpotifyAuth>) -> Self {
        Self {
            http,
            currently_playing_url: config.currently_playing_url(),
            session: auth.session().clone(),
            auth,
        }
    }

    /// Fetches what the user is listening to.
    ///
    /// A 401 triggers at most one token refresh per call, followed by one
    /// retry with the new token. A 429 is waited out according to
    /// `Retry-After` up to [`MAX_RATE_LIMIT_RETRIES`] times. Anything else
    /// that is not a success ends the call.
    pub async fn fetch_currently_playing(&self) -> Result<NowPlaying, UpstreamError> {
        let tokens = self.session.tokens().await;
        if !tokens.has_access_token() {
            return Err(UpstreamError::Unauthenticated);
        }

        let mut access_token = tokens.access_token.clone();
        let mut refreshed = false;
        let mut rate_limit_retries = 0;

        let margin = chrono::Duration::seconds(EXPIRY_MARGIN_SECS);
        if tokens.has_refresh_token() && tokens.is_expired(Utc::now() + margin) {
            tracing::debug!("access token expired, refreshing before request");
            refreshed = true;
            match self.auth.refresh(&tokens.refresh_token).await {
                Ok(fresh) => access_token = fresh.access_token,
                Err(e) => {
                    tracing::warn!(error = %e, "proactive refresh failed, trying stored token")
                }
            }
        }

        loop {
            let response = self
                .http
                .get(&self.currently_playing_url)
                .bearer_auth(&access_token)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::NO_CONTENT {
                return Ok(NowPlaying::NotPlaying);
            }

            if status.is_success() {
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Ok(NowPlaying::NotPlaying);
                }
                let payload: CurrentlyPlayingResponse =
                    serde_json::from_str(&body).map_err(|e| UpstreamError::Failure {
                        status: Some(status),
                        message: format!("unexpected payload: {e}"),
                    })?;
                return Ok(utils::project_now_playing(payload));
            }

            if status == StatusCode::UNAUTHORIZED {
                if refreshed {
                    return Err(UpstreamError::Unauthorized(
                        "access token rejected after refresh".into(),
                    ));
                }
                refreshed = true;

                // the session may hold a newer refresh token than the one read at entry
                let refresh_token = self.session.tokens().await.refresh_token;
                match self.auth.refresh(&refresh_token).await {
                    Ok(fresh) => {
                        tracing::debug!("retrying with refreshed access token");
                        access_token = fresh.access_token;
                    }
                    Err(e) => return Err(UpstreamError::Unauthorized(e.to_string())),
                }
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = utils::parse_retry_after(response.headers().get(RETRY_AFTER));
                if rate_limit_retries >= MAX_RATE_LIMIT_RETRIES {
                    return Err(UpstreamError::RateLimited { retry_after });
                }
                if retry_after > MAX_RETRY_AFTER_SECS {
                    tracing::warn!(
                        retry_after,
                        "retry-after is abnormally high, giving up on this request"
                    );
                    return Err(UpstreamError::RateLimited { retry_after });
                }
                rate_limit_retries += 1;
                tracing::debug!(retry_after, attempt = rate_limit_retries, "rate limited");
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            let message = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "now-playing request failed");
            return Err(UpstreamError::Failure {
                status: Some(status),
                message,
            });
        }
    }
}
