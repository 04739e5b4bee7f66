//! Configuration management for the todos application.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::api::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote todo collection (`TODOS_API_BASE_URL`)
    pub api_base_url: String,
    /// Directory holding the persisted documents (`TODOS_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Mirror create/update/remove to the remote collection (`TODOS_REMOTE_SYNC`)
    pub remote_sync: bool,
    /// HTTP request timeout in seconds (`TODOS_HTTP_TIMEOUT_SECS`)
    pub http_timeout_secs: u64,
    /// How long an operation waits for its result, in seconds (`TODOS_OPERATION_TIMEOUT_SECS`)
    pub operation_timeout_secs: u64,
    /// Tracing filter directives (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base_url: lookup("TODOS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            data_dir: lookup("TODOS_DATA_DIR")
                .map_or_else(|| PathBuf::from(".todos"), PathBuf::from),
            remote_sync: lookup("TODOS_REMOTE_SYNC")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(false),
            http_timeout_secs: lookup("TODOS_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            operation_timeout_secs: lookup("TODOS_OPERATION_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            log_filter: lookup("RUST_LOG")
                .unwrap_or_else(|| "todos=info,todo_sync_runtime=warn".to_string()),
        }
    }

    /// HTTP request timeout
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// How long an operation waits for its result
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
