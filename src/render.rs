//! Terminal and JSON rendering of a board snapshot.
//!
//! Panes are printed in configured order. Panes with `show_change` carry a
//! rank-change marker per result, measured against the baseline pane:
//! `+n` moved up, `-n` moved down, `0` same position, `new` absent from
//! the baseline.

use std::io::{self, Write};

use searchlens_compare::{
    compare, BoardSnapshot, BoardState, CompareConfig, ComparisonSummary, DatasetRef,
    SearchResult, SearchTypeConfig, TypeOutcome,
};
use serde::Serialize;

const SNIPPET_CHARS: usize = 96;

/// Marker text for a rank change.
pub fn change_marker(change: Option<i64>) -> String {
    match change {
        None => "new".to_string(),
        Some(0) => "0".to_string(),
        Some(n) if n > 0 => format!("+{n}"),
        Some(n) => n.to_string(),
    }
}

/// One result in a pane.
///
/// `change` is only present on panes compared against the baseline; there
/// `null` means the result is absent from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneResult {
    #[serde(flatten)]
    pub result: SearchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Option<i64>>,
}

fn annotates(pane: &SearchTypeConfig, snapshot: &BoardSnapshot, config: &CompareConfig) -> bool {
    pane.show_change
        && pane.id != config.baseline
        && snapshot
            .outcome(&config.baseline)
            .and_then(TypeOutcome::results)
            .is_some()
}

/// Results of one pane, annotated when the pane shows changes and the
/// baseline resolved.
fn pane_results(
    pane: &SearchTypeConfig,
    snapshot: &BoardSnapshot,
    config: &CompareConfig,
) -> Option<Vec<PaneResult>> {
    let results = snapshot.outcome(&pane.id)?.results()?;
    let baseline = snapshot
        .outcome(&config.baseline)
        .and_then(TypeOutcome::results);
    match baseline {
        Some(baseline) if annotates(pane, snapshot, config) => Some(
            compare(results, baseline)
                .into_iter()
                .map(|ranked| PaneResult {
                    result: ranked.result,
                    change: Some(ranked.change),
                })
                .collect(),
        ),
        _ => Some(
            results
                .iter()
                .cloned()
                .map(|result| PaneResult { result, change: None })
                .collect(),
        ),
    }
}

fn snippet(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= SNIPPET_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Write the human-readable panes and summary for `snapshot`.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_text<W: Write>(
    out: &mut W,
    snapshot: &BoardSnapshot,
    dataset: &DatasetRef,
    config: &CompareConfig,
) -> io::Result<()> {
    let Some(query) = snapshot.query.as_deref() else {
        return writeln!(out, "(no query)");
    };
    writeln!(
        out,
        "query: \"{query}\"  dataset: {}  {}: {}",
        dataset.id,
        config.toggle,
        if snapshot.blend { "on" } else { "off" }
    )?;

    for pane in &config.types {
        writeln!(out)?;
        writeln!(out, "== {} ({}) ==", pane.label, pane.id)?;
        match snapshot.outcome(&pane.id) {
            None => writeln!(out, "  ... waiting")?,
            Some(TypeOutcome::Failed(err)) => writeln!(out, "  ! request failed: {err}")?,
            Some(TypeOutcome::Resolved(results)) if results.is_empty() => {
                writeln!(out, "  (no results)")?;
            }
            Some(TypeOutcome::Resolved(_)) => {
                for (i, item) in pane_results(pane, snapshot, config)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                {
                    write_result(out, i + 1, item)?;
                }
            }
        }
    }

    if let Some(comparison) = &snapshot.comparison {
        writeln!(out)?;
        writeln!(
            out,
            "{} vs {}: {}",
            comparison.reference_type,
            comparison.baseline_type,
            summary_line(&comparison.summary)
        )?;
    } else if snapshot.state == BoardState::Failed {
        writeln!(out)?;
        writeln!(out, "comparison unavailable: a compared search failed")?;
    }
    Ok(())
}

fn write_result<W: Write>(out: &mut W, rank: usize, item: &PaneResult) -> io::Result<()> {
    let title = item.result.title().unwrap_or(item.result.id.as_str());
    let marker = match item.change {
        Some(change) => format!("[{:>4}] ", change_marker(change)),
        None => String::new(),
    };
    match item.result.score {
        Some(score) => writeln!(out, "  {rank:>2}. {marker}{title}  ({score:.3})")?,
        None => writeln!(out, "  {rank:>2}. {marker}{title}")?,
    }
    if let Some(text) = item.result.text() {
        let indent = if item.change.is_some() { 11 } else { 4 };
        writeln!(out, "  {:indent$}{}", "", snippet(text))?;
    }
    Ok(())
}

/// One-line description of a comparison summary.
pub fn summary_line(summary: &ComparisonSummary) -> String {
    format!(
        "{} shared, {} new, {} dropped ({} up, {} down, {} unchanged)",
        summary.shared,
        summary.new,
        summary.dropped,
        summary.moved_up,
        summary.moved_down,
        summary.unchanged
    )
}

/// Machine-readable form of a settled comparison, printed by `--json`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub query: Option<String>,
    pub dataset: String,
    pub index: String,
    pub toggle: String,
    pub blend: bool,
    pub state: BoardState,
    pub panes: Vec<PaneReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ComparisonSummary>,
}

/// One pane of a [`Report`].
#[derive(Debug, Serialize)]
pub struct PaneReport {
    pub id: String,
    pub label: String,
    pub show_change: bool,
    /// `ok`, `failed` or `pending`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<PaneResult>,
}

impl Report {
    pub fn new(snapshot: &BoardSnapshot, dataset: &DatasetRef, config: &CompareConfig) -> Self {
        let panes = config
            .types
            .iter()
            .map(|pane| {
                let (status, error) = match snapshot.outcome(&pane.id) {
                    None => ("pending", None),
                    Some(TypeOutcome::Failed(err)) => ("failed", Some(err.to_string())),
                    Some(TypeOutcome::Resolved(_)) => ("ok", None),
                };
                PaneReport {
                    id: pane.id.clone(),
                    label: pane.label.clone(),
                    show_change: annotates(pane, snapshot, config),
                    status,
                    error,
                    results: pane_results(pane, snapshot, config).unwrap_or_default(),
                }
            })
            .collect();

        Self {
            query: snapshot.query.clone(),
            dataset: dataset.id.clone(),
            index: dataset.index.clone(),
            toggle: config.toggle.to_string(),
            blend: snapshot.blend,
            state: snapshot.state,
            panes,
            summary: snapshot.comparison.as_ref().map(|c| c.summary),
        }
    }
}
