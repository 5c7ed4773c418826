//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use checkout::DEFAULT_CURRENCY;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_STATE_DIR: &str = ".storefront";

/// Client configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `STOREFRONT_BASE_URL`: gateway root (default: `"http://localhost:8080"`)
/// - `STOREFRONT_TIMEOUT_MS`: per-request deadline (default: `8000`)
/// - `STOREFRONT_STATE_DIR`: directory holding the session record (default: `".storefront"`)
/// - `STOREFRONT_CURRENCY`: charge currency (default: `"USD"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeout_ms: u64,
    pub state_dir: PathBuf,
    pub currency: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`. Blank or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            base_url: get("STOREFRONT_BASE_URL").unwrap_or(defaults.base_url),
            timeout_ms: get("STOREFRONT_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.timeout_ms),
            state_dir: get("STOREFRONT_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            currency: get("STOREFRONT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.currency),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_ms: Option<u64>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = timeout_ms.filter(|ms| *ms > 0) {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            currency: DEFAULT_CURRENCY.to_string(),
            log_level: "info".to_string(),
        }
    }
}
