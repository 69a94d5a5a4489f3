use std::{
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;

use crate::{error::PersistenceError, types::TokenPair};

/// Identifier of the one token record the service keeps.
const TOKEN_RECORD_ID: &str = "spotify";

/// Durable home of the token pair.
///
/// `load` distinguishes "nothing stored yet" (`Ok(None)`) from a store that
/// cannot be read. `save` is an upsert.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<TokenPair>, PersistenceError>;
    async fn save(&self, tokens: &TokenPair) -> Result<(), PersistenceError>;
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSON file holding `{"accessToken": .., "refreshToken": ..}`.
///
/// Saves through one store are serialized, and every save writes its own
/// temp file before renaming it over the record.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TOKEN_RECORD_ID.into());
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{seq}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, PersistenceError> {
        let json = match async_fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::Io(e)),
        };
        let tokens: TokenPair = serde_json::from_str(&json)?;
        Ok(Some(tokens))
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(tokens)?;
        let _guard = self.write_lock.lock().await;
        let temp = self.temp_path();
        async_fs::write(&temp, json).await?;
        if let Err(e) = async_fs::rename(&temp, &self.path).await {
            let _ = async_fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Keeps the record in memory only. Counts saves so callers can check how
/// often the token pair was persisted.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenPair>>,
    saves: Mutex<usize>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            record: Mutex::new(Some(tokens)),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> Option<TokenPair> {
        self.record.lock().map(|r| r.clone()).unwrap_or(None)
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, PersistenceError> {
        Ok(self.current())
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), PersistenceError> {
        if let Ok(mut record) = self.record.lock() {
            *record = Some(tokens.clone());
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
