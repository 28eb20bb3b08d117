//! User display settings.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{KeyValueStore, PersistedState, USER_SETTINGS_KEY};

/// Profile details shown by the shell and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub display_name: String,
    pub email: String,
    pub notifications: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            display_name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            notifications: true,
        }
    }
}

impl UserSettings {
    /// Returns the initials used as an avatar label (at most two letters).
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

pub struct SettingsStore {
    state: PersistedState<UserSettings>,
}

impl SettingsStore {
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistedState::load(store, USER_SETTINGS_KEY).await,
        }
    }

    pub fn settings(&self) -> &UserSettings {
        self.state.get()
    }

    /// Replaces the stored settings. Returns true if the write reached the store.
    pub async fn save(&mut self, settings: UserSettings) -> bool {
        self.state.update(|current| *current = settings).await;
        !self.state.last_write_failed()
    }
}
