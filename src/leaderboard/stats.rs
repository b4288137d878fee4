use serde::Serialize;

use super::rank::RankedRecord;

/// Leader label when the (filtered) board is empty.
pub const NO_LEADER: &str = "None";

/// Summary cards shown above the leaderboard table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardStats {
    pub count: usize,
    pub mean_accuracy: f64,
    pub mean_schema_accuracy: f64,
    pub leading_name: String,
}

impl LeaderboardStats {
    pub fn compute(rows: &[RankedRecord]) -> Self {
        let count = rows.len();
        if count == 0 {
            return Self::default();
        }
        let (acc_sum, schema_sum) = rows.iter().fold((0.0, 0.0), |(acc, schema), row| {
            (
                acc + row.record.effective_accuracy(),
                schema + row.record.effective_schema_accuracy(),
            )
        });
        Self {
            count,
            mean_accuracy: acc_sum / count as f64,
            mean_schema_accuracy: schema_sum / count as f64,
            leading_name: rows[0].name().to_string(),
        }
    }
}

impl Default for LeaderboardStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean_accuracy: 0.0,
            mean_schema_accuracy: 0.0,
            leading_name: NO_LEADER.to_string(),
        }
    }
}
