use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::api::AppState;

pub async fn health(Extension(app): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "authenticated": app.session.is_authenticated().await,
    }))
}
