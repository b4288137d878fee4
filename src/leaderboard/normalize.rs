//! Payload → ordered sequence of [`BenchmarkRecord`].

use serde_json::{Map, Value};

use crate::api::error::{FetchError, FetchResult};
use crate::model::types::{BenchmarkRecord, RawMetrics};

/// Normalize a full `GET /benchmark` body (`{"results": {name: metrics}}`).
///
/// A missing or null `results` key is an empty leaderboard, not an error.
pub fn normalize_payload(payload: &Value) -> FetchResult<Vec<BenchmarkRecord>> {
    let Some(body) = payload.as_object() else {
        return Err(FetchError::MalformedPayload(format!(
            "expected a JSON object body, got {}",
            kind_of(payload)
        )));
    };
    match body.get("results") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(results)) => normalize_results(results),
        Some(other) => Err(FetchError::MalformedPayload(format!(
            "`results` must be an object keyed by pipeline name, got {}",
            kind_of(other)
        ))),
    }
}

/// Inject each key as `name`; every other field passes through untouched.
///
/// Output follows the map's iteration order, which is ascending by name.
pub fn normalize_results(results: &Map<String, Value>) -> FetchResult<Vec<BenchmarkRecord>> {
    Ok(results
        .iter()
        .map(|(name, raw)| BenchmarkRecord::new(name.clone(), RawMetrics::from_value(raw)))
        .collect())
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
