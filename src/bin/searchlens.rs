//! CLI binary for searchlens.
//!
//! Rendered results go to stdout; tracing output goes to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use searchlens::commands::{self, CompareOptions};
use searchlens::{AppConfig, lens_dirs, logging};
use searchlens_compare::BoardState;

/// searchlens: compare lexical and semantic search rankings side by side.
#[derive(Parser)]
#[command(name = "searchlens", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the search API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one query against every search type and compare the rankings.
    Compare(CompareArgs),

    /// List datasets offered by the search API.
    Datasets {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Read queries from stdin and compare each as it is entered.
    Interactive {
        /// Dataset id to start with.
        #[arg(long)]
        dataset: Option<String>,

        /// Start with blended scoring on.
        #[arg(long)]
        hybrid: bool,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct CompareArgs {
    /// Query text.
    query: String,

    /// Dataset id.
    #[arg(long)]
    dataset: Option<String>,

    /// Index name; skips the dataset lookup.
    #[arg(long)]
    index: Option<String>,

    /// Ask hybrid-capable types to blend lexical and vector scoring.
    #[arg(long)]
    hybrid: bool,

    /// Nearest-neighbour count for vector search.
    #[arg(short, long)]
    k: Option<u32>,

    /// Print JSON instead of panes.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);

    // `config init` must work even when the existing file is broken.
    if let Command::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        let path = commands::config_init(&config_path, *force)?;
        println!("{}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = AppConfig::load_or_default(&config_path)?;
    if let Some(base_url) = cli.base_url {
        config.search.base_url = base_url;
    }

    let _log_guard = logging::init(&config.logging, &lens_dirs::logs_dir())?;
    tracing::debug!(config = %config_path.display(), "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Compare(args) => {
            let options = CompareOptions {
                query: args.query,
                dataset: args.dataset,
                index: args.index,
                blend: args.hybrid,
                k: args.k,
                json: args.json,
            };
            let state = commands::run_compare(&config, &options, &mut out).await?;
            if state == BoardState::Failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Datasets { json } => {
            commands::run_datasets(&config, json, &mut out).await?;
        }
        Command::Interactive { dataset, hybrid } => {
            let dataset = match dataset {
                Some(id) => commands::lookup_dataset(&config, &id).await?,
                None => config.dataset.to_ref(),
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            commands::run_interactive(&config, dataset, hybrid, stdin, &mut out).await?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show => commands::config_show(&config, &mut out)?,
            ConfigAction::Path => writeln!(out, "{}", config_path.display())?,
            // Handled before the config is loaded.
            ConfigAction::Init { .. } => {}
        },
    }

    Ok(ExitCode::SUCCESS)
}
