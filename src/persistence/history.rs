//! Query history persistence.
//!
//! Records submitted queries, newest first, keeping at most
//! [`MAX_HISTORY_ENTRIES`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::{KeyValueStore, PersistedState, HISTORY_KEY};

/// Maximum number of entries retained; older entries are evicted first.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Query execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
}

impl QueryStatus {
    /// Returns the status as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Which statuses a history listing keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(QueryStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: QueryStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "success" => Ok(Self::Only(QueryStatus::Success)),
            "error" => Ok(Self::Only(QueryStatus::Error)),
            other => Err(format!("unknown status '{other}' (expected all, success or error)")),
        }
    }
}

/// Narrows a history listing by query text and status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the query.
    pub search: Option<String>,
    pub status: StatusFilter,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        self.status.matches(entry.status)
            && self
                .search
                .as_deref()
                .map_or(true, |text| contains_ignore_case(&entry.query, text))
    }
}

/// Case-insensitive substring test. An empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A query history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    pub status: QueryStatus,
    /// Milliseconds from submission to response.
    pub execution_time: u64,
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub sql: String,
    pub timestamp: DateTime<Utc>,
}

/// The query history log.
pub struct QueryHistory {
    state: PersistedState<Vec<HistoryEntry>>,
}

impl QueryHistory {
    /// Loads the history log from `store`.
    ///
    /// A stored log longer than [`MAX_HISTORY_ENTRIES`] is cut down to the
    /// newest entries and written back.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let mut state: PersistedState<Vec<HistoryEntry>> =
            PersistedState::load(store, HISTORY_KEY).await;
        if state.get().len() > MAX_HISTORY_ENTRIES {
            debug!(
                "Truncating stored history from {} entries",
                state.get().len()
            );
            state.update(|entries| entries.truncate(MAX_HISTORY_ENTRIES)).await;
        }
        Self { state }
    }

    /// Returns entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        self.state.get()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.state.get().len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.state.get().is_empty()
    }

    /// Returns the entries `filter` keeps, most recent first.
    pub fn search(&self, filter: &HistoryFilter) -> Vec<&HistoryEntry> {
        self.state.get().iter().filter(|e| filter.matches(e)).collect()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.state.get().iter().find(|e| e.id == id)
    }

    /// Records a query at the current time.
    pub async fn add(
        &mut self,
        query: &str,
        status: QueryStatus,
        execution_time: u64,
        rows: u64,
        sql: &str,
    ) -> HistoryEntry {
        self.add_at(query, status, execution_time, rows, sql, Utc::now())
            .await
    }

    /// Records a query with an explicit timestamp.
    pub async fn add_at(
        &mut self,
        query: &str,
        status: QueryStatus,
        execution_time: u64,
        rows: u64,
        sql: &str,
        timestamp: DateTime<Utc>,
    ) -> HistoryEntry {
        self.state
            .update(|entries| {
                let mut id = timestamp.timestamp_millis();
                if let Some(newest) = entries.first() {
                    id = id.max(newest.id + 1);
                }

                let entry = HistoryEntry {
                    id,
                    query: query.to_string(),
                    status,
                    execution_time,
                    rows,
                    sql: sql.to_string(),
                    timestamp,
                };

                entries.insert(0, entry.clone());
                entries.truncate(MAX_HISTORY_ENTRIES);
                entry
            })
            .await
    }

    /// Deletes one entry. Returns false if no entry has that id.
    pub async fn delete(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.state.update(|entries| entries.retain(|e| e.id != id)).await;
        true
    }

    /// Deletes every entry and the stored log.
    pub async fn clear(&mut self) -> usize {
        let count = self.len();
        self.state.reset().await;
        count
    }
}

/// Formats how long ago `timestamp` was, relative to `now`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins} min ago")
    } else if hours < 24 {
        format!("{hours} hour{} ago", if hours > 1 { "s" } else { "" })
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}
