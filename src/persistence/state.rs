//! Best-effort persisted values.
//!
//! [`PersistedState`] is the one policy shared by history, favorites, session
//! metrics and settings: load once with a default fallback, write back after
//! every mutation, and never hand a storage failure to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::KeyValueStore;

/// A value mirrored into a [`KeyValueStore`] under a fixed key.
pub struct PersistedState<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    value: T,
    last_write_failed: bool,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Loads the value stored under `key`.
    ///
    /// A missing key, a read failure or undecodable contents all yield
    /// `T::default()`.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let value = match store.load(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to parse stored {key}: {e}");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Failed to load {key}: {e}");
                T::default()
            }
        };

        Self {
            store,
            key,
            value,
            last_write_failed: false,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Returns the storage key.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns true if the most recent write-back did not reach the store.
    pub fn last_write_failed(&self) -> bool {
        self.last_write_failed
    }

    /// Applies `mutate` and writes the new value back.
    pub async fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let result = mutate(&mut self.value);
        self.write_back().await;
        result
    }

    /// Restores the default value and removes the stored copy.
    pub async fn reset(&mut self) {
        self.value = T::default();
        match self.store.remove(self.key).await {
            Ok(()) => self.last_write_failed = false,
            Err(e) => {
                warn!("Failed to remove {}: {e}", self.key);
                self.last_write_failed = true;
            }
        }
    }

    async fn write_back(&mut self) {
        let encoded = match serde_json::to_string(&self.value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode {}: {e}", self.key);
                self.last_write_failed = true;
                return;
            }
        };

        match self.store.save(self.key, &encoded).await {
            Ok(()) => {
                debug!("Saved {} ({} bytes)", self.key, encoded.len());
                self.last_write_failed = false;
            }
            Err(e) => {
                warn!("Failed to save {}: {e}", self.key);
                self.last_write_failed = true;
            }
        }
    }
}
