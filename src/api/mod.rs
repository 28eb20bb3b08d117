//! Query service integration for AskDB.
//!
//! Provides the trait for the remote inventory query API together with an HTTP
//! client and a demo implementation that serves canned answers.

pub mod demo;
pub mod http;

pub use demo::DemoQueryService;
pub use http::{HttpConfig, HttpQueryService, DEFAULT_API_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One result row: column name to value, in the column order the API returned.
pub type Row = serde_json::Map<String, Value>;

/// Response to a natural-language question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaturalLanguageResponse {
    /// Prose answer, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// The SQL the backend generated for the question.
    #[serde(default)]
    pub sql: String,
    /// Backend-reported execution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    /// The question echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub results: Vec<Row>,
}

/// Response to a raw SQL execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

impl SqlResponse {
    /// Returns the reported row count, or the number of returned rows.
    pub fn rows(&self) -> u64 {
        self.row_count.unwrap_or(self.results.len() as u64)
    }
}

/// Renders a cell for display or export: `null` and missing cells are empty,
/// strings are unquoted.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Summary of the connected database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseInfo {
    pub tables: u64,
    pub total_rows: u64,
    pub last_sync: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Tables shown when the service cannot list them.
pub const FALLBACK_TABLES: [&str; 5] = ["t_shirts", "customers", "orders", "inventory", "suppliers"];

/// Trait for the remote query API.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Checks that the service is reachable and accepts the credentials.
    async fn health(&self) -> Result<()>;

    /// Translates a natural-language question into SQL and runs it.
    async fn ask(&self, question: &str) -> Result<NaturalLanguageResponse>;

    /// Executes raw SQL.
    async fn execute_sql(&self, sql: &str) -> Result<SqlResponse>;

    /// Returns database summary information.
    async fn database_info(&self) -> Result<DatabaseInfo>;

    /// Lists queryable tables.
    async fn tables(&self) -> Result<Vec<String>>;

    /// Returns a short label for the service, used in banners and logs.
    fn name(&self) -> &str;
}
