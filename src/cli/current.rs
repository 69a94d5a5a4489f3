use std::sync::Arc;

use tabled::Table;

use crate::{
    config::Config,
    error::UpstreamError,
    info,
    management::Session,
    spotify::{SpotifyAuth, SpotifyPlayer},
    types::NowPlaying,
    utils, warning,
};

/// Prints the currently playing track as a table.
pub async fn current(config: &Config, session: Session) {
    let auth = Arc::new(SpotifyAuth::new(config, session));
    let player = SpotifyPlayer::new(config, auth);

    match player.fetch_currently_playing().await {
        Ok(NowPlaying::Playing(track)) => {
            let table = Table::new(vec![utils::track_table_row(&track)]);
            println!("{}", table);
            if let Some(url) = track.url {
                info!("{}", url);
            }
        }
        Ok(NowPlaying::NotPlaying) => info!("Nothing is playing right now."),
        Err(UpstreamError::Unauthenticated) | Err(UpstreamError::Unauthorized(_)) => {
            warning!("Not logged in or the login has expired. Run `nowplaying auth`.")
        }
        Err(e) => warning!("Failed to fetch the current track: {}", e),
    }
}
