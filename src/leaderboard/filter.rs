use super::rank::RankedRecord;

/// Keep records whose name contains `query`, ignoring case.
///
/// A blank query returns the input unchanged. Ranks are not renumbered.
pub fn filter_by_name(ranked: &[RankedRecord], query: &str) -> Vec<RankedRecord> {
    if query.trim().is_empty() {
        return ranked.to_vec();
    }
    let needle = query.to_lowercase();
    ranked
        .iter()
        .filter(|row| row.name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
