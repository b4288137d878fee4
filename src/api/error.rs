//! Error taxonomy for backend fetches and execution requests.

use serde::Serialize;
use thiserror::Error;

/// Shown when the leaderboard or a detail fetch fails without a usable `detail`.
pub const FETCH_FALLBACK_MESSAGE: &str =
    "Failed to fetch benchmark data. Please check your backend connection.";

/// Errors surfaced at a view boundary. None of these are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// Response shape unusable; the view shows "no data".
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Request failed or the backend was unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// The backend has no benchmark results for this pipeline.
    #[error("no benchmark results for pipeline {0}")]
    NotFound(String),

    /// A form was submitted without its required fields; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },
}

impl FetchError {
    /// Whether a retry affordance makes sense for this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Backend { .. })
    }

    /// Text for the banner or inline message in a view.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedPayload(_) => "No benchmark data available".to_string(),
            Self::Network(_) => FETCH_FALLBACK_MESSAGE.to_string(),
            Self::NotFound(_) => "No data available for this pipeline.".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Backend { detail, .. } => detail.clone(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedPayload(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedPayload(value.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
