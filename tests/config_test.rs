use std::{collections::HashMap, time::Duration};

use nowplaying::{
    config::{Config, DEFAULT_API_URL, DEFAULT_SCOPE, ResponseMode},
    error::ConfigError,
};
use pretty_assertions::assert_eq;

fn required() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
        ("SPOTIFY_API_REDIRECT_URI", "http://localhost:8080/callback"),
        ("TOKEN_STORE_PATH", "/tmp/tokens.json"),
    ])
}

fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

#[test]
fn test_defaults() {
    let config = load(&required()).expect("config");

    assert_eq!(config.client_id, "id");
    assert_eq!(config.scope, DEFAULT_SCOPE);
    assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
    assert_eq!(config.server_addr.to_string(), "127.0.0.1:8080");
    assert_eq!(config.response_mode, ResponseMode::Redirect);
    assert_eq!(config.popup_origin, "*");
    assert_eq!(config.default_return_to, "/");
    assert_eq!(config.state_ttl, None);
    assert_eq!(
        config.currently_playing_url(),
        "https://api.spotify.com/v1/me/player/currently-playing"
    );
}

#[test]
fn test_all_missing_keys_are_reported() {
    let err = load(&HashMap::new()).unwrap_err();

    assert_eq!(
        err,
        ConfigError::Missing(vec![
            "SPOTIFY_API_AUTH_CLIENT_ID",
            "SPOTIFY_API_AUTH_CLIENT_SECRET",
            "SPOTIFY_API_REDIRECT_URI",
            "TOKEN_STORE_PATH",
        ])
    );
    assert!(err.to_string().contains("SPOTIFY_API_AUTH_CLIENT_SECRET"));
}

#[test]
fn test_blank_value_counts_as_missing() {
    let mut vars = required();
    vars.insert("SPOTIFY_API_AUTH_CLIENT_SECRET", "  ");

    assert_eq!(
        load(&vars).unwrap_err(),
        ConfigError::Missing(vec!["SPOTIFY_API_AUTH_CLIENT_SECRET"])
    );
}

#[test]
fn test_optional_overrides() {
    let mut vars = required();
    vars.insert("SERVER_ADDRESS", "0.0.0.0:9000");
    vars.insert("CALLBACK_RESPONSE_MODE", "popup");
    vars.insert("CALLBACK_POPUP_ORIGIN", "https://example.com");
    vars.insert("DEFAULT_RETURN_TO", "/home");
    vars.insert("STATE_TTL_SECS", "600");
    vars.insert("SPOTIFY_API_URL", "http://localhost:1234/v1/");

    let config = load(&vars).expect("config");

    assert_eq!(config.server_addr.port(), 9000);
    assert_eq!(config.response_mode, ResponseMode::Popup);
    assert_eq!(config.popup_origin, "https://example.com");
    assert_eq!(config.default_return_to, "/home");
    assert_eq!(config.state_ttl, Some(Duration::from_secs(600)));
    assert_eq!(
        config.currently_playing_url(),
        "http://localhost:1234/v1/me/player/currently-playing"
    );
}

#[test]
fn test_invalid_values() {
    let cases = [
        ("SERVER_ADDRESS", "not-an-address"),
        ("CALLBACK_RESPONSE_MODE", "iframe"),
        ("STATE_TTL_SECS", "ten"),
        ("SPOTIFY_API_TOKEN_URL", "::nope"),
        ("SPOTIFY_API_REDIRECT_URI", "relative/callback"),
    ];

    for (key, value) in cases {
        let mut vars = required();
        vars.insert(key, value);
        match load(&vars) {
            Err(ConfigError::Invalid { key: reported, .. }) => assert_eq!(reported, key),
            other => panic!("expected invalid {key}, got {other:?}"),
        }
    }
}

#[test]
fn test_response_mode_parsing() {
    assert_eq!("redirect".parse::<ResponseMode>(), Ok(ResponseMode::Redirect));
    assert_eq!("POPUP".parse::<ResponseMode>(), Ok(ResponseMode::Popup));
    assert_eq!(
        "popup-postmessage".parse::<ResponseMode>(),
        Ok(ResponseMode::Popup)
    );
    assert!("".parse::<ResponseMode>().is_err());
}
