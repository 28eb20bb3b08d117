//! Session-scoped query metrics.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{KeyValueStore, PersistedState, SESSION_METRICS_KEY};

/// Counters for the current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub total_queries: u64,
    pub successful_queries: u64,
    /// Execution times in milliseconds, in recording order.
    pub query_times: Vec<u64>,
}

impl SessionMetrics {
    /// Mean execution time, rounded to the nearest millisecond; 0 when empty.
    pub fn average_time(&self) -> u64 {
        if self.query_times.is_empty() {
            return 0;
        }
        let sum: u64 = self.query_times.iter().sum();
        (sum as f64 / self.query_times.len() as f64).round() as u64
    }

    /// Share of successful queries in percent, if any were recorded.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_queries == 0 {
            return None;
        }
        Some(self.successful_queries as f64 * 100.0 / self.total_queries as f64)
    }
}

/// Records query outcomes into session storage.
pub struct SessionTracker {
    state: PersistedState<SessionMetrics>,
}

impl SessionTracker {
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistedState::load(store, SESSION_METRICS_KEY).await,
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        self.state.get()
    }

    /// Records one query execution.
    pub async fn record(&mut self, success: bool, execution_time: u64) {
        self.state
            .update(|m| {
                m.total_queries += 1;
                if success {
                    m.successful_queries += 1;
                }
                m.query_times.push(execution_time);
            })
            .await;
    }

    pub fn average_time(&self) -> u64 {
        self.metrics().average_time()
    }

    /// Starts a fresh session.
    pub async fn reset(&mut self) {
        self.state.reset().await;
    }
}
