use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use reqwest::header::HeaderValue;

use crate::types::{CurrentlyPlayingResponse, Image, NowPlaying, Track, TrackTableRow};

/// Bytes of entropy behind every CSRF state value.
pub const STATE_TOKEN_BYTES: usize = 32;

/// Wait applied when the provider rate limits without a usable hint.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

pub fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn parse_retry_after(value: Option<&HeaderValue>) -> u64 {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Largest image by area; images without dimensions rank last but still win
/// over nothing.
pub fn pick_artwork(images: &[Image]) -> Option<String> {
    images
        .iter()
        .max_by_key(|img| img.width.unwrap_or(0) as u64 * img.height.unwrap_or(0) as u64)
        .map(|img| img.url.clone())
}

pub fn project_now_playing(payload: CurrentlyPlayingResponse) -> NowPlaying {
    let Some(item) = payload.item else {
        return NowPlaying::NotPlaying;
    };

    let (artists, album, artwork_url): (Vec<String>, String, Option<String>) =
        match (&item.album, &item.show) {
            (Some(album), _) => (
                item.artists.iter().map(|a| a.name.clone()).collect(),
                album.name.clone(),
                pick_artwork(&album.images),
            ),
            (None, Some(show)) => {
                let images = if item.images.is_empty() {
                    &show.images
                } else {
                    &item.images
                };
                (
                    show.publisher.iter().cloned().collect(),
                    show.name.clone(),
                    pick_artwork(images),
                )
            }
            (None, None) => (
                item.artists.iter().map(|a| a.name.clone()).collect(),
                String::new(),
                pick_artwork(&item.images),
            ),
        };

    NowPlaying::Playing(Track {
        playing: payload.is_playing,
        name: item.name,
        artists,
        album,
        artwork_url,
        url: item.external_urls.and_then(|u| u.spotify),
        progress_ms: payload.progress_ms,
        duration_ms: item.duration_ms,
    })
}

pub fn format_duration_ms(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn track_table_row(track: &Track) -> TrackTableRow {
    let position = match (track.progress_ms, track.duration_ms) {
        (Some(p), Some(d)) => format!("{} / {}", format_duration_ms(p), format_duration_ms(d)),
        (Some(p), None) => format_duration_ms(p),
        _ => String::from("-"),
    };

    TrackTableRow {
        status: if track.playing { "playing" } else { "paused" }.to_string(),
        name: track.name.clone(),
        artists: track.artists.join(", "),
        album: track.album.clone(),
        position,
    }
}

/// Page served to a login popup: tells the opener how the login went, then
/// closes itself.
pub fn popup_page(origin: &str, success: bool, message: &str) -> String {
    let payload = serde_json::json!({
        "type": "spotify-auth",
        "success": success,
        "message": message,
    });
    // keep "</script>" inside strings from closing the script element
    let payload = payload.to_string().replace("</", "<\\/");
    let origin = serde_json::Value::String(origin.to_string())
        .to_string()
        .replace("</", "<\\/");
    format!(
        "<!doctype html>\n<html><body><p>{text}</p><script>\n\
         if (window.opener) {{ window.opener.postMessage({payload}, {origin}); }}\n\
         window.close();\n</script></body></html>",
        text = escape_html(message),
        payload = payload,
        origin = origin,
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
