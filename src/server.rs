use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, api::AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/current", get(api::current))
        .layer(Extension(state))
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn start_api_server(addr: SocketAddr, state: AppState) -> Res<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Res<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c, shutdown only by kill");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
