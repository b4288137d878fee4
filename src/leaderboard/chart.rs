//! Bar-chart projection of a ranked view.

use serde::Serialize;

use super::rank::RankedRecord;

/// One bar group: a pipeline's accuracies as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub accuracy_pct: f64,
    pub schema_accuracy_pct: f64,
}

/// Series in the same order as the rows they came from.
pub fn accuracy_series(rows: &[RankedRecord]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            name: row.name().to_string(),
            accuracy_pct: row.record.effective_accuracy() * 100.0,
            schema_accuracy_pct: row.record.effective_schema_accuracy() * 100.0,
        })
        .collect()
}

/// Bar height for terminal bar charts, in tenths of a percent.
///
/// Negative values render as an empty bar; values above 100% are kept.
pub fn bar_height(pct: f64) -> u64 {
    if pct.is_finite() && pct > 0.0 {
        (pct * 10.0).round() as u64
    } else {
        0
    }
}
