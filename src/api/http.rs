//! HTTP client for the query API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{DatabaseInfo, NaturalLanguageResponse, QueryService, SqlResponse, TablesResponse};
use crate::error::{AskDbError, Result};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, None)
    }
}

/// Query service reached over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    config: HttpConfig,
    client: Client,
}

impl HttpQueryService {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskDbError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Sends a request and returns the body of a successful response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String> {
        let request = match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        let response = request.send().await.map_err(Self::request_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AskDbError::unavailable(format!("Failed to read response: {e}")))?;

        debug!("Query API responded {status}");

        if status.is_success() {
            Ok(body)
        } else {
            Err(Self::parse_error(status, &body))
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| AskDbError::api(format!("Failed to parse response: {e}")))
    }

    /// Maps a non-success status onto a service failure.
    ///
    /// 401 and 403 mean the key was rejected. Any other status means the
    /// backend could not serve the request; the `{"error"}` body, when there
    /// is one, becomes the detail text.
    fn parse_error(status: StatusCode, body: &str) -> AskDbError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AskDbError::AuthInvalid,
            _ => match serde_json::from_str::<ErrorResponse>(body) {
                Ok(response) => AskDbError::unavailable(format!("HTTP {status}: {}", response.error)),
                Err(_) => AskDbError::unavailable(format!("HTTP {status}")),
            },
        }
    }

    /// Maps a transport failure. Every transport failure means the backend
    /// could not be used.
    fn request_error(error: reqwest::Error) -> AskDbError {
        if error.is_timeout() {
            AskDbError::unavailable("Request timed out")
        } else if error.is_connect() {
            AskDbError::unavailable(format!("Failed to connect to query API: {error}"))
        } else {
            AskDbError::unavailable(format!("Request failed: {error}"))
        }
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn health(&self) -> Result<()> {
        self.send_raw(self.client.get(self.url("/health"))).await?;
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<NaturalLanguageResponse> {
        let request = self
            .client
            .post(self.url("/query"))
            .json(&json!({ "query": question }));
        self.send(request).await
    }

    async fn execute_sql(&self, sql: &str) -> Result<SqlResponse> {
        let request = self
            .client
            .post(self.url("/execute-sql"))
            .json(&json!({ "sql": sql }));
        self.send(request).await
    }

    async fn database_info(&self) -> Result<DatabaseInfo> {
        self.send(self.client.get(self.url("/database/info"))).await
    }

    async fn tables(&self) -> Result<Vec<String>> {
        let response: TablesResponse = self
            .send(self.client.get(self.url("/database/tables")))
            .await?;
        Ok(response.tables)
    }

    fn name(&self) -> &str {
        &self.config.base_url
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}
