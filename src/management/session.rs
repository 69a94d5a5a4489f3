use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{management::TokenStore, types::TokenPair};

/// Handle on the process-wide token pair.
///
/// Cloning the handle shares the pair. The in-memory copy is authoritative:
/// every [`Session::update`] writes through to the store, and a failed write
/// is logged without rolling the memory copy back. Updates are applied one at
/// a time so the store never ends up behind memory.
#[derive(Clone)]
pub struct Session {
    tokens: Arc<Mutex<TokenPair>>,
    store: Arc<dyn TokenStore>,
    updates: Arc<Mutex<()>>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, tokens: TokenPair) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
            store,
            updates: Arc::new(Mutex::new(())),
        }
    }

    /// Starts from whatever the store holds. Nothing stored, or a store that
    /// cannot be read, yields an empty pair.
    pub async fn restore(store: Arc<dyn TokenStore>) -> Self {
        let tokens = match store.load().await {
            Ok(Some(tokens)) => {
                tracing::info!("restored stored token pair");
                tokens
            }
            Ok(None) => {
                tracing::info!("no stored token pair, login required");
                TokenPair::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot load stored token pair, starting empty");
                TokenPair::default()
            }
        };
        Self::new(store, tokens)
    }

    pub async fn tokens(&self) -> TokenPair {
        self.tokens.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.lock().await.has_access_token()
    }

    /// Replaces the pair and persists it. Returns whether the store accepted it.
    pub async fn update(&self, tokens: TokenPair) -> bool {
        // readers only wait on `tokens`, never on the save below
        let _update = self.updates.lock().await;
        {
            let mut current = self.tokens.lock().await;
            *current = tokens.clone();
        }

        match self.store.save(&tokens).await {
            Ok(()) => {
                tracing::debug!("token pair persisted");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot persist token pair, keeping it in memory");
                false
            }
        }
    }
}
