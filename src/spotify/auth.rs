use chrono::{TimeDelta, Utc};
use reqwest::{Client, Url};

use crate::{
    config::Config,
    error::AuthError,
    management::Session,
    types::{TokenPair, TokenResponse},
};

/// Authorization Code flow against the Spotify accounts service.
///
/// Client credentials go out as HTTP Basic authentication on every token
/// request and never as form fields. Every token pair obtained here is
/// written into the [`Session`], which persists it.
pub struct SpotifyAuth {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: Url,
    token_url: Url,
    session: Session,
}

impl SpotifyAuth {
    pub fn new(config: &Config, session: Session) -> Self {
        Self::with_client(Client::new(), config, session)
    }

    pub fn with_client(http: Client, config: &Config, session: Session) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Provider authorization URL carrying `state`. Everything but the state
    /// is fixed configuration.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            self.auth_url.as_str(),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    /// Trades the authorization code from the callback for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;

        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("missing refresh_token".into()))?;

        let tokens = TokenPair {
            access_token: response.access_token,
            refresh_token,
            expires_at: expiry(response.expires_in),
        };

        tracing::info!(scope = ?response.scope, "authorization code exchanged");
        self.session.update(tokens.clone()).await;
        Ok(tokens)
    }

    /// Obtains a fresh access token. Refresh tokens do not always rotate;
    /// when the provider omits one the current one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let rotated = response.refresh_token.as_deref().is_some_and(|t| !t.is_empty());
        let tokens = TokenPair {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| refresh_token.to_string()),
            expires_at: expiry(response.expires_in),
        };

        tracing::info!(rotated, "access token refreshed");
        self.session.update(tokens.clone()).await;
        Ok(tokens)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let res = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "token endpoint rejected grant");
            return Err(AuthError::Rejected { status, body });
        }

        let body = res.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("empty access_token".into()));
        }
        Ok(token)
    }
}

/// Absolute expiry for a relative lifetime. A lifetime that does not fit a
/// timestamp is treated like a missing one.
fn expiry(expires_in: Option<i64>) -> Option<chrono::DateTime<Utc>> {
    let secs = expires_in.filter(|secs| *secs > 0)?;
    let lifetime = TimeDelta::try_seconds(secs)?;
    Utc::now().checked_add_signed(lifetime)
}
