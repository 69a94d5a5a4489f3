use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;

use crate::{
    api::AppState, config::Config, error, management::Session, server::start_api_server,
    success, warning,
};

/// How long `auth` waits for the browser round-trip.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Logs in from the terminal.
///
/// Starts the server in the background, opens `/login` in the default
/// browser and waits until the callback has stored a new token pair.
pub async fn auth(config: &Config, session: Session) {
    let before = session.tokens().await.access_token;

    let state = AppState::new(config, session.clone());
    let addr = config.server_addr;
    tokio::spawn(async move {
        if let Err(e) = start_api_server(addr, state).await {
            error!("Failed to start callback server: {}", e);
        }
    });

    // the redirect uri is the address the browser can actually reach
    let login_url = match Url::parse(&config.redirect_uri)
        .and_then(|u| u.join("/login?returnTo=/health"))
    {
        Ok(url) => url,
        Err(e) => error!("Cannot derive login url from redirect uri: {}", e),
    };

    if webbrowser::open(login_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            login_url
        )
    }

    if wait_for_token(&session, &before).await {
        success!("Authentication successful!");
    } else {
        error!("Authentication failed or timed out.");
    }
}

/// Polls the session until its access token differs from `before`.
async fn wait_for_token(session: &Session, before: &str) -> bool {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for the login to complete...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < LOGIN_TIMEOUT {
        let tokens = session.tokens().await;
        if tokens.has_access_token() && tokens.access_token != before {
            pb.finish_and_clear();
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    false
}
