use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::{error::CsrfStateError, utils};

/// A login that went out to the provider and has not come back yet.
#[derive(Debug, Clone)]
pub struct PendingAuthState {
    pub return_to: String,
    pub created_at: Instant,
}

/// One-time CSRF state values, each bound to where the caller wants to land
/// after logging in.
///
/// Without a TTL entries live until consumed.
#[derive(Debug, Default)]
pub struct StateRegistry {
    pending: Mutex<HashMap<String, PendingAuthState>>,
    ttl: Option<Duration>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn create(&self, return_to: impl Into<String>) -> String {
        let state = utils::generate_state_token();
        let entry = PendingAuthState {
            return_to: return_to.into(),
            created_at: Instant::now(),
        };

        let mut pending = self.lock();
        if let Some(ttl) = self.ttl {
            pending.retain(|_, p| p.created_at.elapsed() < ttl);
        }
        pending.insert(state.clone(), entry);
        state
    }

    /// Removes the entry for `state` and hands back its `returnTo`. A state
    /// can be consumed once; every later attempt is `Unknown`.
    pub fn consume(&self, state: &str) -> Result<String, CsrfStateError> {
        if state.trim().is_empty() {
            return Err(CsrfStateError::Missing);
        }

        let entry = self.lock().remove(state).ok_or(CsrfStateError::Unknown)?;

        match self.ttl {
            Some(ttl) if entry.created_at.elapsed() >= ttl => Err(CsrfStateError::Expired),
            _ => Ok(entry.return_to),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingAuthState>> {
        // entries stay valid even if a holder panicked mid-insert
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
