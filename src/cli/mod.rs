//! # CLI Module
//!
//! User-facing commands of the `nowplaying` binary:
//!
//! - [`serve`] - runs the HTTP service (`/login`, `/callback`, `/current`, `/health`)
//! - [`auth`] - logs in from the terminal: starts the service in the
//!   background, opens `/login` in the browser and waits for the callback
//! - [`current`] - prints the currently playing track once
//!
//! Every command receives the validated [`crate::config::Config`] and a
//! [`crate::management::Session`] restored from the token store, so the
//! commands and the HTTP handlers share one token lifecycle.
//!
//! Output goes through the coloured console macros (`info!`, `success!`,
//! `warning!`, `error!`); request-level logging of the service goes through
//! `tracing`.

mod auth;
mod current;
mod serve;

pub use auth::auth;
pub use current::current;
pub use serve::serve;
