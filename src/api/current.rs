use axum::{Extension, response::Json};

use crate::{
    api::{ApiError, AppState},
    types::NowPlaying,
};

pub async fn current(Extension(app): Extension<AppState>) -> Result<Json<NowPlaying>, ApiError> {
    let now_playing = app.player.fetch_currently_playing().await.map_err(|e| {
        tracing::warn!(error = %e, "cannot fetch currently playing track");
        ApiError::from(e)
    })?;
    Ok(Json(now_playing))
}
