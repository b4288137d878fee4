//! Client configuration: backend location and refresh cadence.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Leaderboard auto-refresh period when nothing overrides it.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Configuration injected into the HTTP client and the polling views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8000/api/v1` (no trailing slash).
    pub base_url: String,
    /// Period of the leaderboard refresh timer.
    pub poll_interval: Duration,
    /// TCP connect timeout. Requests themselves use the transport default.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Load config from environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = dotenvy::var("PLB_API_BASE_URL")
            && !url.trim().is_empty()
        {
            cfg = cfg.with_base_url(url);
        }

        if let Ok(val) = dotenvy::var("PLB_POLL_INTERVAL_SECS")
            && let Ok(secs) = val.parse::<u64>()
            && secs > 0
        {
            cfg.poll_interval = Duration::from_secs(secs);
        }

        if let Ok(val) = dotenvy::var("PLB_CONNECT_TIMEOUT_MS")
            && let Ok(ms) = val.parse::<u64>()
            && ms > 0
        {
            cfg.connect_timeout = Duration::from_millis(ms);
        }

        cfg
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Join an API path (leading slash optional) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
