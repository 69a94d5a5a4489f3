//! Spotify Now-Playing Backend Library
//!
//! This library runs an OAuth2 Authorization Code flow against Spotify, keeps
//! the resulting access/refresh token pair persisted and fresh, and exposes
//! the currently playing track.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for `/login`, `/callback`, `/current` and `/health`
//! - `cli` - Command-line commands built on top of the service
//! - `config` - Configuration loading and validation
//! - `error` - Typed errors of the token lifecycle and upstream calls
//! - `management` - Token persistence, the shared session and CSRF states
//! - `server` - Router and HTTP server
//! - `spotify` - Spotify accounts and Web API clients
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use nowplaying::{config, management::{FileTokenStore, Session}};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nowplaying::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let store = Arc::new(FileTokenStore::new(&config.token_store_path));
//!     let session = Session::restore(store).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the edges of the application (server startup, CLI commands) where
/// the typed errors of the inner modules are only reported, not matched on.
///
/// # Example
///
/// ```
/// use nowplaying::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Console output for CLI commands; the server logs through `tracing`.
///
/// # Example
///
/// ```
/// info!("Waiting for the login to complete...");
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1. Only for failures that leave nothing to
/// serve, such as missing configuration at startup.
///
/// # Example
///
/// ```
/// error!("Missing required configuration: {}", keys);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, open {} manually", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
