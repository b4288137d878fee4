//! Display formatting shared by the TUI and the one-shot text output.

use chrono::{DateTime, Utc};

use crate::leaderboard::{RankedRecord, Tier};
use crate::model::types::{BenchmarkRecord, MismatchEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

/// A leaderboard row ready for a table cell per field.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardRow {
    pub rank: String,
    pub tier: Option<Tier>,
    pub name: String,
    pub accuracy: f64,
    pub accuracy_label: String,
    pub schema_accuracy: f64,
    pub schema_accuracy_label: String,
    pub total_tests: String,
    pub wrong_matches: String,
}

impl LeaderboardRow {
    pub fn from_ranked(row: &RankedRecord) -> Self {
        let record = &row.record;
        Self {
            rank: format!("#{}", row.rank),
            tier: row.tier,
            name: record.name.clone(),
            accuracy: record.effective_accuracy(),
            accuracy_label: format_pct(record.metrics.accuracy, 1),
            schema_accuracy: record.effective_schema_accuracy(),
            schema_accuracy_label: format_pct(record.metrics.schema_accuracy, 1),
            total_tests: record.effective_total_tests().to_string(),
            wrong_matches: mismatch_label(record),
        }
    }
}

pub fn leaderboard_rows(rows: &[RankedRecord]) -> Vec<LeaderboardRow> {
    rows.iter().map(LeaderboardRow::from_ranked).collect()
}

/// Render a `[0, 1]` metric as a percentage. Absent or zero values show `0%`.
pub fn format_pct(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v != 0.0 && v.is_finite() => format!("{:.*}%", decimals, v * 100.0),
        _ => "0%".to_string(),
    }
}

/// Mismatch count, or `N/A` when the backend sent no list at all.
pub fn mismatch_label(record: &BenchmarkRecord) -> String {
    record
        .mismatch_count()
        .map_or_else(|| "N/A".to_string(), |n| n.to_string())
}

/// Cells for one mismatch, in detail-table column order.
pub fn mismatch_cells(entry: &MismatchEntry) -> [String; 8] {
    let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    [
        cell(&entry.original_column),
        cell(&entry.predicted_fitted_column),
        cell(&entry.predicted_fitted_schema),
        cell(&entry.expected_fitted_column),
        cell(&entry.expected_fitted_schema),
        cell(&entry.env_id),
        cell(&entry.table_name),
        cell(&entry.explanation),
    ]
}

pub const MISMATCH_HEADERS: [&str; 8] = [
    "Original",
    "Predicted",
    "Predicted Schema",
    "Expected",
    "Expected Schema",
    "Env",
    "Table",
    "Explanation",
];

pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn last_updated_label(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format!("Last updated {}", format_ts(ts)),
        None => "Not yet updated".to_string(),
    }
}
