//! Benchmark entity structs as served by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metrics for one pipeline, exactly as the backend sent them.
///
/// Every field is optional; absence is preserved here and only resolved to a
/// number through the `effective_*` accessors on [`BenchmarkRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_matches: Option<Vec<MismatchEntry>>,
    /// Fields the leaderboard does not interpret (`timestamp`, `column_accuracy`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One incorrect prediction reported by a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchEntry {
    #[serde(default)]
    pub original_column: Option<String>,
    #[serde(default)]
    pub predicted_fitted_column: Option<String>,
    #[serde(default)]
    pub predicted_fitted_schema: Option<String>,
    #[serde(default)]
    pub expected_fitted_column: Option<String>,
    #[serde(default)]
    pub expected_fitted_schema: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub env_id: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// A pipeline's latest benchmark outcome, keyed by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub name: String,
    #[serde(flatten)]
    pub metrics: RawMetrics,
}

impl RawMetrics {
    /// Decode one `results` entry field by field.
    ///
    /// A non-object entry yields empty metrics. A known field whose value has
    /// the wrong type is left unset and its raw value is kept in `extra`.
    pub fn from_value(raw: &Value) -> Self {
        let Some(fields) = raw.as_object() else {
            return Self::default();
        };
        let mut metrics = Self::default();
        for (key, value) in fields {
            if value.is_null() {
                continue;
            }
            let taken = match key.as_str() {
                "accuracy" => value.as_f64().map(|v| metrics.accuracy = Some(v)),
                "schema_accuracy" => value.as_f64().map(|v| metrics.schema_accuracy = Some(v)),
                "total_tests" => value.as_u64().map(|v| metrics.total_tests = Some(v)),
                "wrong_matches" => {
                    MismatchEntry::list_from_value(value).map(|v| metrics.wrong_matches = Some(v))
                }
                _ => None,
            };
            if taken.is_none() {
                metrics.extra.insert(key.clone(), value.clone());
            }
        }
        metrics
    }
}

impl MismatchEntry {
    /// Lenient decode: non-string fields are treated as absent.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let fields = raw.as_object()?;
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            original_column: text("original_column"),
            predicted_fitted_column: text("predicted_fitted_column"),
            predicted_fitted_schema: text("predicted_fitted_schema"),
            expected_fitted_column: text("expected_fitted_column"),
            expected_fitted_schema: text("expected_fitted_schema"),
            explanation: text("explanation"),
            env_id: text("env_id"),
            table_name: text("table_name"),
            job_id: text("job_id"),
        })
    }

    /// `None` unless `raw` is an array of objects.
    pub fn list_from_value(raw: &Value) -> Option<Vec<Self>> {
        raw.as_array()?.iter().map(Self::from_value).collect()
    }
}

/// Resolve an optional metric to the value used for comparison and aggregation.
pub fn effective(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

impl BenchmarkRecord {
    pub fn new(name: impl Into<String>, metrics: RawMetrics) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }

    pub fn effective_accuracy(&self) -> f64 {
        effective(self.metrics.accuracy)
    }

    pub fn effective_schema_accuracy(&self) -> f64 {
        effective(self.metrics.schema_accuracy)
    }

    pub fn effective_total_tests(&self) -> u64 {
        self.metrics.total_tests.unwrap_or(0)
    }

    /// `None` when the backend omitted `wrong_matches` entirely ("N/A"),
    /// as opposed to `Some(0)` for an explicit empty list.
    pub fn mismatch_count(&self) -> Option<usize> {
        self.metrics.wrong_matches.as_ref().map(Vec::len)
    }

    pub fn mismatches(&self) -> &[MismatchEntry] {
        self.metrics.wrong_matches.as_deref().unwrap_or(&[])
    }
}
