use serde::Serialize;
use serde_json::Value;

use super::normalize::kind_of;
use crate::api::error::{FetchError, FetchResult};
use crate::model::types::{BenchmarkRecord, MismatchEntry, RawMetrics};

/// What the mismatch section of the detail view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "count")]
pub enum DetailOutcome {
    /// No mismatches reported, whether the list was empty or absent.
    AllCorrect,
    Mismatches(usize),
}

/// A single pipeline's record plus its derived mismatch count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineDetail {
    #[serde(flatten)]
    pub record: BenchmarkRecord,
    pub mismatch_count: usize,
    pub outcome: DetailOutcome,
}

impl PipelineDetail {
    pub fn mismatches(&self) -> &[MismatchEntry] {
        self.record.mismatches()
    }
}

/// Project a `GET /benchmark/{name}` body (`{"results": metrics}`).
///
/// A null or missing `results` means the backend knows no such pipeline.
pub fn project_detail(name: &str, payload: &Value) -> FetchResult<PipelineDetail> {
    let Some(body) = payload.as_object() else {
        return Err(FetchError::MalformedPayload(format!(
            "expected a JSON object body, got {}",
            kind_of(payload)
        )));
    };
    let raw = match body.get("results") {
        None | Some(Value::Null) => return Err(FetchError::NotFound(name.to_string())),
        Some(raw @ Value::Object(_)) => raw,
        Some(other) => {
            return Err(FetchError::MalformedPayload(format!(
                "`results` for pipeline `{name}` must be an object, got {}",
                kind_of(other)
            )));
        }
    };
    if let Some(list) = raw.get("wrong_matches")
        && !list.is_null()
    {
        validate_mismatch_list(name, list)?;
    }
    Ok(detail_from_record(BenchmarkRecord::new(
        name,
        RawMetrics::from_value(raw),
    )))
}

pub fn detail_from_record(record: BenchmarkRecord) -> PipelineDetail {
    let mismatch_count = record.mismatch_count().unwrap_or(0);
    let outcome = if mismatch_count == 0 {
        DetailOutcome::AllCorrect
    } else {
        DetailOutcome::Mismatches(mismatch_count)
    };
    PipelineDetail {
        record,
        mismatch_count,
        outcome,
    }
}

fn validate_mismatch_list(name: &str, list: &Value) -> FetchResult<()> {
    let Some(entries) = list.as_array() else {
        return Err(FetchError::MalformedPayload(format!(
            "`wrong_matches` for pipeline `{name}` must be an array, got {}",
            kind_of(list)
        )));
    };
    if let Some((idx, bad)) = entries.iter().enumerate().find(|(_, e)| !e.is_object()) {
        return Err(FetchError::MalformedPayload(format!(
            "`wrong_matches[{idx}]` for pipeline `{name}` must be an object, got {}",
            kind_of(bad)
        )));
    }
    Ok(())
}
