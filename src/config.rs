//! Configuration management for AskDB.
//!
//! Handles loading configuration from TOML files and resolving it against
//! command-line flags and environment variables.

use crate::error::{AskDbError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for AskDB.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Query API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Read-only guard configuration.
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Local state storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Query API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// API base URL (e.g., "http://localhost:8000/api").
    pub url: Option<String>,

    /// Bearer token for the API.
    pub key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Always use the built-in demo data.
    #[serde(default)]
    pub demo: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout_secs: default_timeout_secs(),
            demo: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyConfig {
    /// Also check statements with their comments blanked out.
    #[serde(default = "default_inspect_comments")]
    pub inspect_comments: bool,
}

fn default_inspect_comments() -> bool {
    true
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            inspect_comments: default_inspect_comments(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// State database path; the platform default when unset.
    pub path: Option<PathBuf>,
}

/// Values from flags or the environment, which win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub state_db: Option<PathBuf>,
    pub demo: bool,
}

/// Where queries are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Built-in sample data.
    Demo,
    /// A live query API.
    Http {
        url: String,
        key: String,
        timeout_secs: u64,
    },
}

/// Configuration after precedence has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub backend: Backend,
    pub inspect_comments: bool,
    /// Explicit state database path, if any.
    pub state_db: Option<PathBuf>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("askdb")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AskDbError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AskDbError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `overrides` on top of this file configuration.
    ///
    /// The live API is used only when both a URL and a key are known and demo
    /// mode was not requested.
    pub fn resolve(&self, overrides: &Overrides) -> Result<ResolvedConfig> {
        let url = non_empty(overrides.api_url.as_deref()).or(non_empty(self.api.url.as_deref()));
        let key = non_empty(overrides.api_key.as_deref()).or(non_empty(self.api.key.as_deref()));

        let backend = match (url, key) {
            (Some(url), Some(key)) if !overrides.demo && !self.api.demo => {
                validate_api_url(url)?;
                Backend::Http {
                    url: url.to_string(),
                    key: key.to_string(),
                    timeout_secs: self.api.timeout_secs,
                }
            }
            _ => Backend::Demo,
        };

        Ok(ResolvedConfig {
            backend,
            inspect_comments: self.safety.inspect_comments,
            state_db: overrides
                .state_db
                .clone()
                .or_else(|| self.storage.path.clone()),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checks that `url` is an absolute http(s) URL.
pub fn validate_api_url(url: &str) -> Result<Url> {
    let parsed =
        Url::parse(url).map_err(|e| AskDbError::config(format!("Invalid API URL '{url}': {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AskDbError::config(format!(
            "Invalid scheme '{}'. Expected 'http' or 'https'",
            parsed.scheme()
        )));
    }

    Ok(parsed)
}
