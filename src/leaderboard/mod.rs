//! Leaderboard derivation layer.
//!
//! Turns raw benchmark payloads into the views the UI renders:
//!
//! - **[`normalize`]**: payload mapping → `Vec<BenchmarkRecord>`.
//! - **[`rank`]**: stable descending sort by effective accuracy, podium tiers.
//! - **[`filter`]**: case-insensitive name search over a ranked view.
//! - **[`stats`]**: count, mean accuracies and leader of a view.
//! - **[`chart`]**: per-pipeline percentage series for bar charts.
//! - **[`detail`]**: single-pipeline projection with mismatch count.
//!
//! Everything here is pure; fetching and state live in [`crate::polling`].

pub mod chart;
pub mod detail;
pub mod filter;
pub mod normalize;
pub mod rank;
pub mod stats;

pub use chart::{ChartPoint, accuracy_series};
pub use detail::{DetailOutcome, PipelineDetail, project_detail};
pub use filter::filter_by_name;
pub use normalize::{normalize_payload, normalize_results};
pub use rank::{RankedRecord, Tier, rank};
pub use stats::{LeaderboardStats, NO_LEADER};

use serde::Serialize;

use crate::api::error::FetchResult;

/// Ranked snapshot plus the filtered view and its derived statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardView {
    pub ranked: Vec<RankedRecord>,
    pub query: String,
    pub rows: Vec<RankedRecord>,
    pub stats: LeaderboardStats,
}

impl BoardView {
    pub fn new(ranked: Vec<RankedRecord>, query: &str) -> Self {
        let rows = filter_by_name(&ranked, query);
        let stats = LeaderboardStats::compute(&rows);
        Self {
            ranked,
            query: query.to_string(),
            rows,
            stats,
        }
    }

    /// Normalize and rank a `GET /benchmark` body in one go.
    pub fn from_payload(payload: &serde_json::Value, query: &str) -> FetchResult<Self> {
        let records = normalize_payload(payload)?;
        Ok(Self::new(rank(records), query))
    }

    pub fn with_query(&self, query: &str) -> Self {
        Self::new(self.ranked.clone(), query)
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        accuracy_series(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn three_pipeline_scenario() {
        let payload = json!({"results": {
            "A": {"accuracy": 0.9},
            "B": {"accuracy": 0.5},
            "C": {}
        }});
        let view = BoardView::from_payload(&payload, "").unwrap();
        let names: Vec<&str> = view.rows.iter().map(RankedRecord::name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(view.rows[0].rank, 1);
        assert_eq!(view.rows[0].tier.map(Tier::level), Some(1));
        assert_eq!(view.rows[2].record.effective_accuracy(), 0.0);
        assert!((view.stats.mean_accuracy - 0.4667).abs() < 1e-4);
    }

    #[test]
    fn requery_recomputes_stats_from_filtered_rows() {
        let payload = json!({"results": {
            "fast-n8n": {"accuracy": 0.8},
            "slow-n8n": {"accuracy": 0.4},
            "other": {"accuracy": 1.0}
        }});
        let view = BoardView::from_payload(&payload, "").unwrap();
        assert_eq!(view.stats.leading_name, "other");

        let narrowed = view.with_query("N8N");
        assert_eq!(narrowed.stats.count, 2);
        assert_eq!(narrowed.stats.leading_name, "fast-n8n");
        assert!((narrowed.stats.mean_accuracy - 0.6).abs() < 1e-9);
        assert_eq!(narrowed.ranked, view.ranked);
        assert_eq!(narrowed.chart().len(), 2);
    }
}
