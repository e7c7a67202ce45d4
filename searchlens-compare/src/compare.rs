//! Rank comparison between two ordered result lists.
//!
//! Each reference result is matched by id against the baseline list and
//! annotated with `change = baseline_index - reference_index`, or `None`
//! when the baseline does not contain it. The inputs are never mutated:
//! every pass builds a fresh annotated list, so re-running on unchanged
//! inputs yields identical output.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{ResultSet, SearchResult};

/// A reference result annotated with its rank change against the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: SearchResult,
    /// `baseline_index - reference_index`, or `None` if absent from the baseline.
    pub change: Option<i64>,
}

/// Counts describing how the reference list differs from the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    /// Reference results also present in the baseline.
    pub shared: usize,
    /// Reference results absent from the baseline.
    pub new: usize,
    /// Baseline results absent from the reference.
    pub dropped: usize,
    /// Shared results with a positive change.
    pub moved_up: usize,
    /// Shared results with a negative change.
    pub moved_down: usize,
    /// Shared results at the same position in both lists.
    pub unchanged: usize,
}

/// Full outcome of comparing one result set against another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub reference_type: String,
    pub baseline_type: String,
    /// Reference results in reference order, annotated.
    pub ranked: Vec<RankedResult>,
    /// Baseline results that the reference does not contain, in baseline order.
    pub dropped: Vec<SearchResult>,
    pub summary: ComparisonSummary,
}

/// Signed rank delta of an item found at `reference_index` in the reference
/// and `baseline_index` in the baseline.
pub fn rank_change(reference_index: usize, baseline_index: usize) -> i64 {
    baseline_index as i64 - reference_index as i64
}

/// Annotate every reference result with its rank change against `baseline`.
///
/// Ids are matched exactly; if the baseline repeats an id, its first
/// position counts. An empty reference yields an empty list.
pub fn compare(reference: &[SearchResult], baseline: &[SearchResult]) -> Vec<RankedResult> {
    if reference.is_empty() {
        return Vec::new();
    }

    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(baseline.len());
    for (j, result) in baseline.iter().enumerate() {
        positions.entry(result.id.as_str()).or_insert(j);
    }

    reference
        .iter()
        .enumerate()
        .map(|(i, result)| RankedResult {
            result: result.clone(),
            change: positions.get(result.id.as_str()).map(|&j| rank_change(i, j)),
        })
        .collect()
}

/// Compare two result sets, collecting dropped results and summary counts.
pub fn compare_sets(reference: &ResultSet, baseline: &ResultSet) -> Comparison {
    let ranked = compare(&reference.results, &baseline.results);

    let reference_ids: HashSet<&str> = reference.results.iter().map(|r| r.id.as_str()).collect();
    let dropped: Vec<SearchResult> = baseline
        .results
        .iter()
        .filter(|r| !reference_ids.contains(r.id.as_str()))
        .cloned()
        .collect();

    let mut summary = ComparisonSummary {
        dropped: dropped.len(),
        ..Default::default()
    };
    for item in &ranked {
        match item.change {
            None => summary.new += 1,
            Some(change) => {
                summary.shared += 1;
                match change.signum() {
                    1 => summary.moved_up += 1,
                    -1 => summary.moved_down += 1,
                    _ => summary.unchanged += 1,
                }
            }
        }
    }

    Comparison {
        reference_type: reference.type_id.clone(),
        baseline_type: baseline.type_id.clone(),
        ranked,
        dropped,
        summary,
    }
}
