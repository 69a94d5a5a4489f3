use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::{ApiError, AppState, found},
    config::ResponseMode,
    utils,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(app): Extension<AppState>,
) -> Response {
    // the state is spent even when the provider reports an error
    let return_to = match app.states.consume(params.state.as_deref().unwrap_or_default()) {
        Ok(return_to) => return_to,
        Err(e) => {
            tracing::warn!(error = %e, "rejected callback state");
            return fail(&app, ApiError::from(e));
        }
    };

    if let Some(error) = params.error {
        return fail(
            &app,
            ApiError::BadRequest(format!("authorization was not granted: {error}")),
        );
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return fail(&app, ApiError::BadRequest("missing code parameter".into()));
    };

    match app.auth.exchange_code(&code).await {
        Ok(_) => match app.callback.mode {
            ResponseMode::Redirect => found(&return_to),
            ResponseMode::Popup => Html(utils::popup_page(
                &app.callback.popup_origin,
                true,
                "Authentication successful. You can close this window.",
            ))
            .into_response(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "authorization code exchange failed");
            fail(&app, ApiError::from(e))
        }
    }
}

fn fail(app: &AppState, err: ApiError) -> Response {
    let status: StatusCode = err.status();
    let message = err.message();
    match app.callback.mode {
        ResponseMode::Redirect => (status, format!("Login failed: {message}")).into_response(),
        ResponseMode::Popup => (
            status,
            Html(utils::popup_page(
                &app.callback.popup_origin,
                false,
                &format!("Login failed: {message}"),
            )),
        )
            .into_response(),
    }
}
