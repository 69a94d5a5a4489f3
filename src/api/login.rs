use axum::{
    Extension,
    extract::Query,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::api::{ApiError, AppState, found};

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

pub async fn login(
    Query(params): Query<LoginParams>,
    Extension(app): Extension<AppState>,
) -> Response {
    let return_to = params
        .return_to
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| app.callback.default_return_to.clone());

    let state = app.states.create(return_to);
    match app.auth.authorization_url(&state) {
        Ok(url) => {
            tracing::info!("redirecting to spotify authorization");
            found(url.as_str())
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
