#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use nowplaying::{
    config::Config,
    management::{MemoryTokenStore, Session},
    types::TokenPair,
};
use serde_json::{Value, json};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const PLAYER_PATH: &str = "/v1/me/player/currently-playing";
pub const TOKEN_PATH: &str = "/api/token";

// Helper function to build a config pointing every Spotify endpoint at `base`
pub fn test_config(base: &str) -> Config {
    test_config_with(base, &[])
}

pub fn test_config_with(base: &str, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID".into(), CLIENT_ID.into()),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET".into(), CLIENT_SECRET.into()),
        ("SPOTIFY_API_REDIRECT_URI".into(), REDIRECT_URI.into()),
        ("TOKEN_STORE_PATH".into(), "unused-token.json".into()),
        ("SPOTIFY_API_AUTH_URL".into(), format!("{base}/authorize")),
        ("SPOTIFY_API_TOKEN_URL".into(), format!("{base}{TOKEN_PATH}")),
        ("SPOTIFY_API_URL".into(), format!("{base}/v1")),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid")
}

// Helper function to create a session backed by an in-memory store
pub fn memory_session(tokens: TokenPair) -> (Session, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::new(store.clone(), tokens);
    (session, store)
}

pub fn track_payload(is_playing: bool) -> Value {
    json!({
        "is_playing": is_playing,
        "progress_ms": 61_000,
        "currently_playing_type": "track",
        "item": {
            "name": "Windowlicker",
            "duration_ms": 367_000,
            "artists": [{ "name": "Aphex Twin" }],
            "album": {
                "name": "Windowlicker",
                "images": [
                    { "url": "https://i.scdn.co/image/small", "width": 64, "height": 64 },
                    { "url": "https://i.scdn.co/image/large", "width": 640, "height": 640 },
                    { "url": "https://i.scdn.co/image/medium", "width": 300, "height": 300 }
                ]
            },
            "external_urls": { "spotify": "https://open.spotify.com/track/abc" }
        }
    })
}
