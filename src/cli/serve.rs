use crate::{api::AppState, config::Config, error, management::Session, server};

pub async fn serve(config: &Config, session: Session) {
    let state = AppState::new(config, session);
    if let Err(e) = server::start_api_server(config.server_addr, state).await {
        error!("Server stopped: {}", e);
    }
}
