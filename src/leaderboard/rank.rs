use serde::Serialize;
use std::cmp::Ordering;

use crate::model::types::BenchmarkRecord;

/// Podium tier for the top three positions. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Gold,
    Silver,
    Bronze,
}

impl Tier {
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Gold => 1,
            Self::Silver => 2,
            Self::Bronze => 3,
        }
    }
}

/// A record together with its 1-based leaderboard position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    pub rank: usize,
    pub tier: Option<Tier>,
    #[serde(flatten)]
    pub record: BenchmarkRecord,
}

impl RankedRecord {
    pub fn name(&self) -> &str {
        &self.record.name
    }
}

/// Sort by effective accuracy, descending. Ties keep their input order.
pub fn rank(records: Vec<BenchmarkRecord>) -> Vec<RankedRecord> {
    let mut records = records;
    records.sort_by(compare_by_accuracy);
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let rank = idx + 1;
            RankedRecord {
                rank,
                tier: Tier::for_rank(rank),
                record,
            }
        })
        .collect()
}

fn compare_by_accuracy(a: &BenchmarkRecord, b: &BenchmarkRecord) -> Ordering {
    b.effective_accuracy()
        .partial_cmp(&a.effective_accuracy())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::RawMetrics;

    fn rec(name: &str, accuracy: Option<f64>) -> BenchmarkRecord {
        BenchmarkRecord::new(
            name,
            RawMetrics {
                accuracy,
                ..RawMetrics::default()
            },
        )
    }

    fn names(ranked: &[RankedRecord]) -> Vec<&str> {
        ranked.iter().map(RankedRecord::name).collect()
    }

    #[test]
    fn sorts_descending_with_absent_as_zero() {
        let ranked = rank(vec![
            rec("C", None),
            rec("B", Some(0.5)),
            rec("A", Some(0.9)),
        ]);
        assert_eq!(names(&ranked), vec!["A", "B", "C"]);
        assert_eq!(ranked[2].record.metrics.accuracy, None);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank(vec![
            rec("first", Some(0.5)),
            rec("zero", None),
            rec("second", Some(0.5)),
            rec("explicit-zero", Some(0.0)),
        ]);
        assert_eq!(
            names(&ranked),
            vec!["first", "second", "zero", "explicit-zero"]
        );
    }

    #[test]
    fn ranks_are_dense_and_tiers_cover_top_three() {
        let ranked = rank(vec![
            rec("a", Some(0.4)),
            rec("b", Some(0.4)),
            rec("c", Some(0.3)),
            rec("d", Some(0.2)),
        ]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(ranked[0].tier, Some(Tier::Gold));
        assert_eq!(ranked[1].tier, Some(Tier::Silver));
        assert_eq!(ranked[2].tier, Some(Tier::Bronze));
        assert_eq!(ranked[3].tier, None);
    }

    #[test]
    fn out_of_range_values_sort_without_panicking() {
        let ranked = rank(vec![rec("low", Some(-1.0)), rec("high", Some(3.5))]);
        assert_eq!(names(&ranked), vec!["high", "low"]);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
