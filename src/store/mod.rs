//! Per-user favorite stop persistence
//!
//! One record per user, last write wins. The intent handler only sees the
//! [`PreferenceStore`] trait so the backend can change without touching it.

pub mod sqlite;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

pub use sqlite::SqliteStore;

/// Errors from a preference backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

/// A user's saved stop, line and direction
///
/// Ids reference catalog entries; the handler checks them before saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: String,
    pub stop_id: String,
    pub line_id: String,
    /// Direction entry id (`<line>-<DirectionRef>`)
    pub direction: String,
}

/// Key-value storage of user preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Saved preference for a user, if any
    async fn get(&self, user_id: &str) -> Result<Option<UserPreference>, StoreError>;

    /// Create or overwrite a user's preference
    async fn put(&self, preference: &UserPreference) -> Result<(), StoreError>;
}

/// Preference store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Deployment region; selects the database file
    pub region: String,
    /// Table holding one row per user
    pub table: String,
    pub data_dir: PathBuf,
    /// Keep preferences in process memory only
    pub in_memory: bool,
}

impl StoreConfig {
    /// Database file for the configured region
    ///
    /// # Errors
    ///
    /// Returns error if the region is not a plain name (letters, digits,
    /// `_` and `-`), so the file always lands inside `data_dir`
    pub fn database_path(&self) -> crate::Result<PathBuf> {
        if !is_plain_name(&self.region) {
            return Err(crate::Error::Config(format!(
                "invalid store region: {:?}",
                self.region
            )));
        }
        Ok(self.data_dir.join(format!("preferences-{}.db", self.region)))
    }
}

/// Longest accepted region or table name
const MAX_NAME_LEN: usize = 64;

/// Non-empty ASCII letters, digits, `_` and `-`
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Open the configured backend
///
/// # Errors
///
/// Returns error if the database cannot be opened or the table name is invalid
pub fn open(config: &StoreConfig) -> crate::Result<Arc<dyn PreferenceStore>> {
    if config.in_memory {
        tracing::info!("using in-memory preference store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = config.database_path()?;
    std::fs::create_dir_all(&config.data_dir)?;
    let store = SqliteStore::open(&path, &config.table)?;
    tracing::info!(
        path = %path.display(),
        table = %config.table,
        region = %config.region,
        "preference store opened"
    );
    Ok(Arc::new(store))
}

/// Process-local store, lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, UserPreference>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserPreference>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, preference: &UserPreference) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(preference.user_id.clone(), preference.clone());
        Ok(())
    }
}
