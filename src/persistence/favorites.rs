//! Favorite queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::history::contains_ignore_case;
use super::{KeyValueStore, PersistedState, FAVORITES_KEY};

/// Length of the name derived from a query when none is given.
const DEFAULT_NAME_CHARS: usize = 50;

/// A query the user saved explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: i64,
    pub query: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

/// Saved favorites, in the order they were saved.
pub struct Favorites {
    state: PersistedState<Vec<FavoriteEntry>>,
}

impl Favorites {
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistedState::load(store, FAVORITES_KEY).await,
        }
    }

    pub fn list(&self) -> &[FavoriteEntry] {
        self.state.get()
    }

    /// Returns favorites whose query contains `text`, ignoring case.
    pub fn search(&self, text: &str) -> Vec<&FavoriteEntry> {
        self.state
            .get()
            .iter()
            .filter(|f| contains_ignore_case(&f.query, text))
            .collect()
    }

    pub fn get(&self, id: i64) -> Option<&FavoriteEntry> {
        self.state.get().iter().find(|f| f.id == id)
    }

    /// Saves `query`. An absent or empty name falls back to the start of the query.
    pub async fn save(&mut self, query: &str, name: Option<&str>) -> FavoriteEntry {
        self.save_at(query, name, Utc::now()).await
    }

    pub async fn save_at(
        &mut self,
        query: &str,
        name: Option<&str>,
        saved_at: DateTime<Utc>,
    ) -> FavoriteEntry {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => query.chars().take(DEFAULT_NAME_CHARS).collect(),
        };

        self.state
            .update(|favorites| {
                let mut id = saved_at.timestamp_millis();
                if let Some(max) = favorites.iter().map(|f| f.id).max() {
                    id = id.max(max + 1);
                }

                let entry = FavoriteEntry {
                    id,
                    query: query.to_string(),
                    name,
                    saved_at,
                };
                favorites.push(entry.clone());
                entry
            })
            .await
    }

    /// Removes a favorite. Returns false if no favorite has that id.
    pub async fn remove(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.state.update(|favorites| favorites.retain(|f| f.id != id)).await;
        true
    }
}
