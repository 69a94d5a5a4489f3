mod common;

use std::{collections::HashMap, sync::Arc};

use nowplaying::{
    error::AuthError,
    management::{FileTokenStore, Session, TokenStore},
    spotify::SpotifyAuth,
    types::TokenPair,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{CLIENT_ID, CLIENT_SECRET, REDIRECT_URI, TOKEN_PATH, memory_session, test_config};

#[tokio::test]
async fn authorization_url_carries_fixed_params_and_state() {
    let config = test_config("https://accounts.example.com");
    let (session, _) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&config, session);

    let url = auth.authorization_url("state-123").expect("url");
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_eq!(url.host_str(), Some("accounts.example.com"));
    assert_eq!(url.path(), "/authorize");
    assert_eq!(params["client_id"], CLIENT_ID);
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], REDIRECT_URI);
    assert_eq!(
        params["scope"],
        "user-read-currently-playing user-read-playback-state"
    );
    assert_eq!(params["state"], "state-123");
    assert!(!url.as_str().contains(CLIENT_SECRET));
}

#[tokio::test]
async fn exchange_code_persists_pair_that_loads_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "scope": "user-read-currently-playing",
            "expires_in": 3600,
            "refresh_token": "refresh-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("tempdir");
    let store = Arc::new(FileTokenStore::new(temp.path().join("tokens.json")));
    let session = Session::new(store.clone(), TokenPair::default());
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session.clone());

    let tokens = auth.exchange_code("auth-code").await.expect("exchange");

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.refresh_token, "refresh-1");
    assert!(tokens.expires_at.is_some());
    assert_eq!(session.tokens().await, tokens);
    assert_eq!(store.load().await.expect("load"), Some(tokens));

    // credentials travel only in the Authorization header
    let requests = server.received_requests().await.expect("recorded requests");
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(!body.contains(CLIENT_SECRET));
    assert!(!body.contains("client_id"));
}

#[tokio::test]
async fn exchange_code_rejection_carries_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session.clone());

    let err = auth.exchange_code("bad-code").await.unwrap_err();

    match &err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(err.is_rejection());
    assert_eq!(store.save_count(), 0);
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn exchange_code_without_refresh_token_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "access-1" })),
        )
        .mount(&server)
        .await;

    let (session, store) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session);

    let err = auth.exchange_code("code").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn exchange_code_with_out_of_range_lifetime_has_no_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 10_000_000_000_000_i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session);

    let tokens = auth.exchange_code("code").await.expect("exchange");

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.expires_at, None);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn exchange_code_network_failure_is_typed() {
    // nothing listens on the discard port
    let config = test_config("http://127.0.0.1:9");
    let (session, _) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&config, session);

    let err = auth.exchange_code("code").await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn refresh_keeps_refresh_token_when_not_rotated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = memory_session(TokenPair::new("access-1", "refresh-1"));
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session.clone());

    let tokens = auth.refresh("refresh-1").await.expect("refresh");

    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(tokens.refresh_token, "refresh-1");
    assert_eq!(store.current(), Some(tokens.clone()));
    assert_eq!(store.save_count(), 1);
    assert_eq!(session.tokens().await, tokens);
}

#[tokio::test]
async fn refresh_adopts_rotated_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = memory_session(TokenPair::new("access-1", "refresh-1"));
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session.clone());

    let tokens = auth.refresh("refresh-1").await.expect("refresh");
    assert_eq!(tokens.refresh_token, "refresh-2");
    assert_eq!(tokens.expires_at, None);
}

#[tokio::test]
async fn refresh_without_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, store) = memory_session(TokenPair::default());
    let auth = SpotifyAuth::new(&test_config(&server.uri()), session);

    let err = auth.refresh("").await.unwrap_err();
    assert!(matches!(err, AuthError::NoRefreshToken));
    assert_eq!(store.save_count(), 0);
}
