//! Request engine configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WALLETDESK_API_BASE_URL` | `https://frontend-case-study.onrender.com/api` | Backend base URL |
//! | `WALLETDESK_API_TIMEOUT_MS` | `12000` | Per-request timeout, `0` disables it |

use std::env;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "WALLETDESK_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "WALLETDESK_API_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "https://frontend-case-study.onrender.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Explicit configuration handed to [`crate::engine::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: format!("walletdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL));

        let timeout = lookup(TIMEOUT_ENV)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(Some(DEFAULT_TIMEOUT), timeout_from_millis);

        Self::new(base_url).with_timeout(timeout)
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// `None` disables the per-request timer.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|value| !value.is_zero());
        self
    }

    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(timeout_from_millis(timeout_ms))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Joins the base URL, `path` (slash-prefixed if needed) and a query string.
    pub fn url_for(&self, path: &str, query: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}{query}", self.base_url)
        } else {
            format!("{}/{path}{query}", self.base_url)
        }
    }
}

fn timeout_from_millis(timeout_ms: u64) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
