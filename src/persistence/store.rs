//! Key-value storage seam.
//!
//! Stores hold JSON documents addressed by fixed string keys. The on-disk
//! store is [`StateDb`](super::StateDb); [`MemoryStore`] backs session scope.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key under which query history is stored.
pub const HISTORY_KEY: &str = "askdb_query_history";

/// Key under which favorites are stored.
pub const FAVORITES_KEY: &str = "askdb_favorites";

/// Key under which session metrics are stored.
pub const SESSION_METRICS_KEY: &str = "askdb_session_metrics";

/// Key under which user display settings are stored.
pub const USER_SETTINGS_KEY: &str = "askdb_user_settings";

/// A string-keyed store of serialized values.
///
/// Every operation reports failure as a storage error; callers decide
/// whether to surface or swallow it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store whose contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
