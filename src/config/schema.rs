use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fetch::FallbackPolicy;
use crate::history::HISTORY_KEY;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// service:
///   base_url: "http://localhost:5000"
///   timeout: "10s"
///   retries: 3
///   fallback: local
/// history:
///   backend: file
///   path: "/home/me/.local/share/car-value"
/// pricing:
///   current_year: 2024
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Remote prediction backend. Without a `base_url` everything runs locally.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout as a humantime duration, e.g. "10s" or "1m"
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Retries after a failed connection attempt
    #[serde(default = "default_retries")]
    pub retries: usize,

    #[serde(default)]
    pub fallback: FallbackPolicy,
}

fn default_timeout() -> String {
    "10s".to_string()
}

fn default_retries() -> usize {
    3
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: default_timeout(),
            retries: default_retries(),
            fallback: FallbackPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// cacache store in the user cache directory
    #[default]
    Cache,
    /// One JSON file per key
    File,
    /// Nothing persisted between runs
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory override for the cache and file backends
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_history_key")]
    pub key: String,
}

fn default_history_key() -> String {
    HISTORY_KEY.to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            key: default_history_key(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Year used to derive car age when none is given (default: this year)
    #[serde(default)]
    pub current_year: Option<i32>,
}
