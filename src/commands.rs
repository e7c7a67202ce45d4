//! Command implementations behind the `searchlens` binary.
//!
//! Every command writes to a caller-supplied writer so it can be driven
//! from tests with an in-memory buffer.

use std::io::Write;
use std::path::{Path, PathBuf};

use searchlens_compare::{
    ApiBackend, BoardSnapshot, BoardState, DatasetRef, Dispatcher, Generation, SearchBackend,
    SearchSession, Toggles,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::render::{self, Report};

/// Options for a one-shot comparison.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub query: String,
    /// Dataset id; looked up via `/api/datasets` unless `index` is also given.
    pub dataset: Option<String>,
    /// Index override.
    pub index: Option<String>,
    pub blend: bool,
    pub k: Option<u32>,
    pub json: bool,
}

fn dispatcher(config: &AppConfig) -> Result<Dispatcher<ApiBackend>> {
    let backend = ApiBackend::new(&config.search)?;
    Ok(Dispatcher::new(backend, config.search.clone())?)
}

/// Work out which dataset to query from the CLI overrides and the config.
async fn resolve_dataset<B: SearchBackend + 'static>(
    dispatcher: &Dispatcher<B>,
    config: &AppConfig,
    dataset: Option<&str>,
    index: Option<&str>,
) -> Result<DatasetRef> {
    match (dataset, index) {
        (Some(id), Some(index)) => Ok(DatasetRef::new(id, index)),
        (Some(id), None) if id == config.dataset.id => Ok(config.dataset.to_ref()),
        (Some(id), None) => {
            let found = dispatcher.find_dataset(id).await?;
            Ok(DatasetRef::from(&found))
        }
        (None, Some(index)) => Ok(DatasetRef::new(config.dataset.id.clone(), index)),
        (None, None) => Ok(config.dataset.to_ref()),
    }
}

/// Resolve a dataset id to the index it lives in.
///
/// # Errors
///
/// Returns [`searchlens_compare::SearchError::UnknownDataset`] (wrapped) if
/// the API does not list `id`.
pub async fn lookup_dataset(config: &AppConfig, id: &str) -> Result<DatasetRef> {
    let dispatcher = dispatcher(config)?;
    resolve_dataset(&dispatcher, config, Some(id), None).await
}

/// Run one comparison, wait for every search type, and print the result.
///
/// Returns the final board state; an empty query yields
/// [`BoardState::Empty`] without sending anything.
///
/// # Errors
///
/// Returns an error on invalid configuration, an unknown dataset, or a
/// failed write. Per-type request failures are printed, not returned.
pub async fn run_compare<W: Write>(
    config: &AppConfig,
    options: &CompareOptions,
    out: &mut W,
) -> Result<BoardState> {
    let mut config = config.clone();
    if options.k.is_some() {
        config.search.k = options.k;
    }
    let dispatcher = dispatcher(&config)?;
    let dataset = resolve_dataset(
        &dispatcher,
        &config,
        options.dataset.as_deref(),
        options.index.as_deref(),
    )
    .await?;

    let toggles = Toggles {
        blend: options.blend,
    };
    let Some(handle) = dispatcher
        .dispatch(&options.query, &dataset, toggles)
        .into_handle()
    else {
        tracing::info!("empty query, nothing to compare");
        return Ok(BoardState::Empty);
    };
    let snapshot = match handle.wait().await {
        Some(snapshot) => snapshot,
        None => dispatcher.board().snapshot(),
    };

    if options.json {
        let report = Report::new(&snapshot, &dataset, &config.search);
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Render(e.to_string()))?;
        writeln!(out, "{json}")?;
    } else {
        render::write_text(out, &snapshot, &dataset, &config.search)?;
    }
    Ok(snapshot.state)
}

/// List the datasets the search API offers.
///
/// # Errors
///
/// Returns an error if the API request fails or output cannot be written.
pub async fn run_datasets<W: Write>(config: &AppConfig, json: bool, out: &mut W) -> Result<()> {
    let backend = ApiBackend::new(&config.search)?;
    let datasets = backend.datasets().await?;

    if json {
        let json = serde_json::to_string_pretty(&datasets)
            .map_err(|e| AppError::Render(e.to_string()))?;
        writeln!(out, "{json}")?;
        return Ok(());
    }
    if datasets.is_empty() {
        writeln!(out, "no datasets")?;
        return Ok(());
    }
    for dataset in datasets.values() {
        let marker = if dataset.id == config.dataset.id { "*" } else { " " };
        writeln!(
            out,
            "{marker} {:<16} {:<24} {}",
            dataset.id, dataset.index, dataset.label
        )?;
    }
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Query(String),
    Blend(bool),
    Dataset(String),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

impl InputLine {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Self::Query(line.to_owned());
        };
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("quit" | "q" | "exit"), None, _) => Self::Quit,
            (Some("help" | "h"), None, _) => Self::Help,
            (Some("refresh" | "r"), None, _) => Self::Refresh,
            (Some("hybrid" | "blend"), Some("on" | "true"), None) => Self::Blend(true),
            (Some("hybrid" | "blend"), Some("off" | "false"), None) => Self::Blend(false),
            (Some("dataset"), Some(id), None) => Self::Dataset(id.to_owned()),
            _ => Self::Unknown(line.to_owned()),
        }
    }
}

const HELP: &str = "\
type a query to compare, or:
  :hybrid on|off   toggle blended scoring
  :dataset ID      switch dataset
  :refresh         re-run the current query
  :quit            exit";

/// Read queries line by line and print each comparison once it settles.
///
/// A new line supersedes a query that is still in flight. On end of input
/// the last query is allowed to settle before returning.
///
/// # Errors
///
/// Returns an error on invalid configuration, unreadable input, or a failed
/// write.
pub async fn run_interactive<R, W>(
    config: &AppConfig,
    dataset: DatasetRef,
    blend: bool,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = SearchSession::new(dispatcher(config)?, dataset);
    session.set_blend(blend);
    let mut updates = session.board().subscribe();
    let mut rendered: Generation = session.board().generation();
    let mut lines = input.lines();

    writeln!(out, "{HELP}")?;
    out.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("input closed; waiting for the last query to settle");
                    break;
                };
                match InputLine::parse(&line) {
                    InputLine::Quit => return Ok(()),
                    InputLine::Query(query) => {
                        session.set_query(&query);
                    }
                    InputLine::Blend(on) => {
                        session.set_blend(on);
                    }
                    InputLine::Refresh => {
                        session.refresh();
                    }
                    InputLine::Dataset(id) => {
                        match session.dispatcher().find_dataset(&id).await {
                            Ok(found) => {
                                session.set_dataset(DatasetRef::from(&found));
                            }
                            Err(err) => writeln!(out, "! {err}")?,
                        }
                    }
                    InputLine::Help => writeln!(out, "{HELP}")?,
                    InputLine::Unknown(line) => writeln!(out, "unknown command: {line}")?,
                }
                out.flush()?;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = updates.borrow_and_update().clone();
                render_settled(out, &snapshot, &session, config, &mut rendered)?;
            }
        }
    }

    loop {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.query.is_none() || snapshot.is_settled() {
            render_settled(out, &snapshot, &session, config, &mut rendered)?;
            return Ok(());
        }
        if updates.changed().await.is_err() {
            return Ok(());
        }
    }
}

/// Print `snapshot` if it is settled, has a query, and was not printed yet.
fn render_settled<W: Write, B: SearchBackend + 'static>(
    out: &mut W,
    snapshot: &BoardSnapshot,
    session: &SearchSession<B>,
    config: &AppConfig,
    rendered: &mut Generation,
) -> Result<()> {
    if snapshot.query.is_none() || !snapshot.is_settled() || snapshot.generation == *rendered {
        return Ok(());
    }
    *rendered = snapshot.generation;
    writeln!(out)?;
    render::write_text(out, snapshot, session.dataset(), &config.search)?;
    out.flush()?;
    Ok(())
}

/// Write the default configuration to `path`.
///
/// # Errors
///
/// Returns [`AppError::Config`] if the file exists and `force` is not set,
/// or an I/O error if it cannot be written.
pub fn config_init(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(AppError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    AppConfig::default().save_to_file(path)?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(path.to_path_buf())
}

/// Print the effective configuration as TOML.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn config_show<W: Write>(config: &AppConfig, out: &mut W) -> Result<()> {
    write!(out, "{}", config.to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn parse_plain_query() {
        assert_eq!(
            InputLine::parse("  star wars "),
            InputLine::Query("star wars".into())
        );
        assert_eq!(InputLine::parse(""), InputLine::Query(String::new()));
    }

    #[test]
    fn parse_commands() {
        assert_eq!(InputLine::parse(":quit"), InputLine::Quit);
        assert_eq!(InputLine::parse(":q"), InputLine::Quit);
        assert_eq!(InputLine::parse(":hybrid on"), InputLine::Blend(true));
        assert_eq!(InputLine::parse(":hybrid off"), InputLine::Blend(false));
        assert_eq!(InputLine::parse(":refresh"), InputLine::Refresh);
        assert_eq!(InputLine::parse(":help"), InputLine::Help);
        assert_eq!(
            InputLine::parse(":dataset tmdb"),
            InputLine::Dataset("tmdb".into())
        );
    }

    #[test]
    fn parse_unknown_commands() {
        assert_eq!(
            InputLine::parse(":hybrid maybe"),
            InputLine::Unknown(":hybrid maybe".into())
        );
        assert_eq!(InputLine::parse(":frobnicate"), InputLine::Unknown(":frobnicate".into()));
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        config_init(&path, false).unwrap();
        assert!(path.exists());
        assert!(matches!(config_init(&path, false), Err(AppError::Config(_))));
        assert!(config_init(&path, true).is_ok());
        assert_eq!(AppConfig::from_file(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn config_show_prints_toml() {
        let mut out = Vec::new();
        config_show(&AppConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("base_url = \"http://localhost:5000\""));
    }

    #[tokio::test]
    async fn empty_query_compares_nothing() {
        let options = CompareOptions::default();
        let mut out = Vec::new();
        let state = run_compare(&AppConfig::default(), &options, &mut out)
            .await
            .unwrap();
        assert_eq!(state, BoardState::Empty);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn invalid_config_is_an_error() {
        let mut config = AppConfig::default();
        config.search.reference = "bm25".into();
        let options = CompareOptions {
            query: "alien".into(),
            ..Default::default()
        };
        let err = run_compare(&config, &options, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
    }
}
