//! Error types for AskDB.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Failure kinds reported by the query service, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The API rejected the configured key (HTTP 401/403).
    AuthInvalid,
    /// The backend could not be reached or is not serving requests.
    ServiceUnavailable,
    /// Any other failure.
    Generic,
}

impl FailureKind {
    /// Returns the wire name of the failure kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthInvalid => "AUTH_INVALID",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Generic => "ERROR",
        }
    }
}

/// Main error type for AskDB operations.
#[derive(Error, Debug)]
pub enum AskDbError {
    /// The API key is invalid or missing.
    #[error("API key is invalid or missing")]
    AuthInvalid,

    /// Backend unreachable or answering with a non-success status.
    #[error("Query service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Other API errors, such as a response body that cannot be decoded.
    #[error("API error: {0}")]
    Api(String),

    /// Invalid query input (empty question, empty SQL).
    #[error("Query error: {0}")]
    Query(String),

    /// Local state storage errors (open, read, write).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors (invalid config file, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AskDbError {
    /// Creates a service-unavailable error with the given message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Creates a generic API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a storage error with the given message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthInvalid => "Authentication Error",
            Self::ServiceUnavailable(_) => "Service Unavailable",
            Self::Api(_) => "API Error",
            Self::Query(_) => "Query Error",
            Self::Storage(_) => "Storage Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Maps this error onto the service failure kinds.
    ///
    /// Errors that never come from the query service are `Generic`.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::AuthInvalid => FailureKind::AuthInvalid,
            Self::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            _ => FailureKind::Generic,
        }
    }

    /// Returns the message shown to the user for a failed submission.
    pub fn user_message(&self) -> String {
        match self.failure_kind() {
            FailureKind::AuthInvalid => {
                "Live responses are currently unavailable. API key is invalid or missing."
                    .to_string()
            }
            FailureKind::ServiceUnavailable => {
                "Live responses are currently unavailable. Backend server is not responding."
                    .to_string()
            }
            FailureKind::Generic => format!("Unable to process your query: {self}"),
        }
    }
}

/// Result type alias using AskDbError.
pub type Result<T> = std::result::Result<T, AskDbError>;
