//! # Spotify Integration Module
//!
//! Everything that talks to Spotify lives here:
//!
//! - [`auth`] - Authorization Code flow: building the authorization URL,
//!   exchanging the callback code, refreshing the access token.
//! - [`player`] - The authenticated now-playing request, including the
//!   refresh-then-retry and rate-limit-then-retry handling.
//!
//! ## Token lifecycle
//!
//! ```text
//! /login ──► authorization URL ──► user consents ──► /callback?code=..
//!                                                        │
//!                                    SpotifyAuth::exchange_code
//!                                                        │
//!                                             Session::update ──► TokenStore
//!
//! /current ──► SpotifyPlayer::fetch_currently_playing
//!                 │ 401 ─► SpotifyAuth::refresh ─► Session::update ─► retry once
//!                 │ 429 ─► sleep(Retry-After) ─► retry (bounded)
//! ```
//!
//! Both clients share one [`crate::management::Session`]; the session is
//! the only place the token pair is mutated.

pub mod auth;
pub mod player;

pub use auth::SpotifyAuth;
pub use player::SpotifyPlayer;
