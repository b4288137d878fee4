//! HTTP client for the benchmark backend.

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{FETCH_FALLBACK_MESSAGE, FetchError, FetchResult};
use super::forms::{BenchmarkRunForm, PipelineRunForm};
use crate::config::ClientConfig;

const PIPELINE_FALLBACK_MESSAGE: &str = "Error executing pipeline";
const BENCHMARK_FALLBACK_MESSAGE: &str = "Error executing benchmark";

/// Read side of the backend, as consumed by the polling views.
///
/// Implementations return the raw JSON body; shaping it is the caller's job.
pub trait BenchmarkApi: Send + Sync + 'static {
    /// `GET /benchmark` → `{"results": {name: metrics}}`.
    fn fetch_leaderboard(&self) -> impl Future<Output = FetchResult<Value>> + Send;

    /// `GET /benchmark/{name}` → `{"results": metrics}`.
    fn fetch_pipeline(&self, name: &str) -> impl Future<Output = FetchResult<Value>> + Send;
}

/// reqwest-backed [`BenchmarkApi`] plus the execution endpoints.
#[derive(Debug, Clone)]
pub struct HttpBenchmarkClient {
    config: ClientConfig,
    http: Client,
}

impl HttpBenchmarkClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("plb/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /` health probe.
    pub async fn health(&self) -> FetchResult<Value> {
        let url = format!("{}/", self.config.base_url);
        let response = self.http.get(&url).send().await?;
        read_json(response, FETCH_FALLBACK_MESSAGE, None).await
    }

    /// `POST /pipeline/run` with the uploaded spreadsheet.
    ///
    /// The timeout is forwarded to the backend; the client waits as long as
    /// the transport allows.
    pub async fn run_pipeline(&self, form: &PipelineRunForm) -> FetchResult<Value> {
        let body = form.into_multipart().await?;
        let url = self.config.endpoint("pipeline/run");
        info!(
            pipeline = %form.pipeline_name,
            env_id = %form.env_id,
            timeout_secs = form.timeout_secs,
            "pipeline_run_submit"
        );
        let response = self.http.post(&url).multipart(body).send().await?;
        read_json(response, PIPELINE_FALLBACK_MESSAGE, None).await
    }

    /// `POST /benchmark` for a pipeline route.
    pub async fn run_benchmark(&self, form: &BenchmarkRunForm) -> FetchResult<Value> {
        let body = form.into_multipart()?;
        let url = self.config.endpoint("benchmark");
        info!(
            pipeline = %form.pipeline_name,
            use_mock = form.use_mock,
            timeout_secs = form.timeout_secs,
            "benchmark_run_submit"
        );
        let response = self.http.post(&url).multipart(body).send().await?;
        read_json(response, BENCHMARK_FALLBACK_MESSAGE, None).await
    }
}

impl BenchmarkApi for HttpBenchmarkClient {
    async fn fetch_leaderboard(&self) -> FetchResult<Value> {
        let url = self.config.endpoint("benchmark");
        debug!(url = %url, "leaderboard_fetch_start");
        let response = self.http.get(&url).send().await?;
        read_json(response, FETCH_FALLBACK_MESSAGE, None).await
    }

    async fn fetch_pipeline(&self, name: &str) -> FetchResult<Value> {
        let url = self
            .config
            .endpoint(&format!("benchmark/{}", urlencoding::encode(name)));
        debug!(url = %url, pipeline = name, "detail_fetch_start");
        let response = self.http.get(&url).send().await?;
        read_json(response, FETCH_FALLBACK_MESSAGE, Some(name)).await
    }
}

/// Decode a success body, or map an error status onto [`FetchError`].
///
/// `not_found_for` names the pipeline when a missing resource should become
/// [`FetchError::NotFound`] rather than a backend error.
async fn read_json(
    response: Response,
    fallback: &str,
    not_found_for: Option<&str>,
) -> FetchResult<Value> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(FetchError::from);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    if let Some(name) = not_found_for
        && is_not_found(status, detail.as_deref())
    {
        return Err(FetchError::NotFound(name.to_string()));
    }
    warn!(status = status.as_u16(), detail = ?detail, "backend_error");
    Err(FetchError::Backend {
        status: status.as_u16(),
        detail: detail.unwrap_or_else(|| fallback.to_string()),
    })
}

// The backend re-raises its own 404 as a 500 whose detail starts with "404".
fn is_not_found(status: StatusCode, detail: Option<&str>) -> bool {
    status == StatusCode::NOT_FOUND
        || (status.is_server_error() && detail.is_some_and(|d| d.trim_start().starts_with("404")))
}

/// Pull the human-readable `detail` out of an error body.
///
/// String details are used as-is; list details (request validation errors)
/// are joined on `; ` using each item's `msg` when present.
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(
            error_detail(r#"{"detail": "Database connection failed: timeout"}"#).as_deref(),
            Some("Database connection failed: timeout")
        );
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = r#"{"detail": [
            {"loc": ["body", "file"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "pipeline_route"], "msg": "field required"}
        ]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn missing_or_empty_detail_falls_back() {
        assert_eq!(error_detail(r#"{"error": "x"}"#), None);
        assert_eq!(error_detail(r#"{"detail": ""}"#), None);
        assert_eq!(error_detail("<html>502 Bad Gateway</html>"), None);
    }

    #[test]
    fn rewrapped_404_counts_as_not_found() {
        assert!(is_not_found(StatusCode::NOT_FOUND, None));
        assert!(is_not_found(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("404: No benchmark results found for pipeline ghost")
        ));
        assert!(!is_not_found(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("Database connection failed")
        ));
        assert!(!is_not_found(StatusCode::BAD_REQUEST, Some("404")));
    }

    #[test]
    fn client_builds_from_default_config() {
        let client = HttpBenchmarkClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().base_url, "http://localhost:8000/api/v1");
    }
}
