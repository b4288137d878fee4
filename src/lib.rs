pub mod api;
pub mod config;
pub mod leaderboard;
pub mod model;
pub mod polling;
pub mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use api::client::{BenchmarkApi, HttpBenchmarkClient};
use api::error::FetchError;
use api::forms::{BenchmarkRunForm, DEFAULT_ENV_ID, DEFAULT_TIMEOUT_SECS, PipelineRunForm};
use config::ClientConfig;
use leaderboard::{BoardView, PipelineDetail, project_detail};
use ui::data::{MISMATCH_HEADERS, format_pct, leaderboard_rows, mismatch_cells};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "plb",
    version,
    about = "Leaderboard and benchmark runner for column-fitting pipelines"
)]
pub struct Cli {
    /// Backend API root, e.g. http://localhost:8000/api/v1 (overrides PLB_API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive leaderboard
    Tui {
        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,

        /// Seconds between automatic refreshes (overrides PLB_POLL_INTERVAL_SECS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: Option<u64>,
    },
    /// Print the ranked leaderboard and its statistics
    Leaderboard {
        /// Case-insensitive pipeline name filter
        #[arg(long, default_value = "")]
        query: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one pipeline's metrics and wrong matches
    Detail {
        pipeline: String,

        #[arg(long)]
        json: bool,
    },
    /// Run a pipeline once against an uploaded spreadsheet
    RunPipeline {
        /// Spreadsheet to upload (.xlsx or .xls)
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, default_value = "")]
        pipeline_name: String,

        #[arg(long, default_value = "")]
        pipeline_route: String,

        #[arg(long, default_value = DEFAULT_ENV_ID)]
        env_id: String,

        /// Seconds the backend may spend on the run
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
    /// Benchmark a pipeline route across all environments
    RunBenchmark {
        #[arg(long, default_value = "")]
        pipeline_name: String,

        #[arg(long, default_value = "")]
        pipeline_route: String,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Ask the backend to use its mock provider
        #[arg(long)]
        use_mock: bool,
    },
    /// Check that the backend is reachable
    Health,
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui { .. }))?;

    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }

    match cli.command {
        Commands::Tui {
            once,
            poll_interval,
        } => {
            if let Some(secs) = poll_interval {
                config = config.with_poll_interval(Duration::from_secs(secs));
            }
            let client = Arc::new(HttpBenchmarkClient::new(config.clone())?);
            ui::tui::run_tui(client, config, once).await
        }
        Commands::Leaderboard { query, json } => {
            let client = HttpBenchmarkClient::new(config)?;
            let view = load_board(&client, &query).await?;
            if json {
                print_json(&view)
            } else {
                print_text(&render_board_text(&view))
            }
        }
        Commands::Detail { pipeline, json } => {
            let client = HttpBenchmarkClient::new(config)?;
            let detail = load_detail(&client, &pipeline).await?;
            if json {
                print_json(&detail)
            } else {
                print_text(&render_detail_text(&detail))
            }
        }
        Commands::RunPipeline {
            file,
            pipeline_name,
            pipeline_route,
            env_id,
            timeout,
        } => {
            let form = PipelineRunForm {
                file,
                pipeline_name,
                env_id,
                pipeline_route,
                timeout_secs: timeout,
            };
            form.validate()?;
            let client = HttpBenchmarkClient::new(config)?;
            let result = client.run_pipeline(&form).await?;
            print_json(&result)
        }
        Commands::RunBenchmark {
            pipeline_name,
            pipeline_route,
            timeout,
            use_mock,
        } => {
            let form = BenchmarkRunForm {
                pipeline_name,
                pipeline_route,
                timeout_secs: timeout,
                use_mock,
            };
            form.validate()?;
            let client = HttpBenchmarkClient::new(config)?;
            let result = client.run_benchmark(&form).await?;
            print_json(&result)
        }
        Commands::Health => {
            let client = HttpBenchmarkClient::new(config)?;
            let status = client.health().await?;
            print_json(&status)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "plb", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

/// Fetch, normalize, rank and filter in one go.
pub async fn load_board<A: BenchmarkApi>(api: &A, query: &str) -> Result<BoardView, FetchError> {
    let payload = api.fetch_leaderboard().await?;
    BoardView::from_payload(&payload, query)
}

pub async fn load_detail<A: BenchmarkApi>(
    api: &A,
    pipeline: &str,
) -> Result<PipelineDetail, FetchError> {
    let payload = api.fetch_pipeline(pipeline).await?;
    project_detail(pipeline, &payload)
}

pub fn render_board_text(view: &BoardView) -> String {
    let stats = &view.stats;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Pipelines: {}  Mean accuracy: {:.1}%  Mean schema accuracy: {:.1}%  Leader: {}",
        stats.count,
        stats.mean_accuracy * 100.0,
        stats.mean_schema_accuracy * 100.0,
        stats.leading_name
    );
    if view.rows.is_empty() {
        let _ = writeln!(out, "No benchmark data available");
        return out;
    }
    let width = view
        .rows
        .iter()
        .map(|r| r.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("Pipeline".len());
    let _ = writeln!(
        out,
        "{:<5} {:<width$} {:>9} {:>9} {:>6} {:>6}",
        "Rank", "Pipeline", "Accuracy", "Schema", "Tests", "Wrong"
    );
    for row in leaderboard_rows(&view.rows) {
        let _ = writeln!(
            out,
            "{:<5} {:<width$} {:>9} {:>9} {:>6} {:>6}",
            row.rank,
            row.name,
            row.accuracy_label,
            row.schema_accuracy_label,
            row.total_tests,
            row.wrong_matches
        );
    }
    out
}

pub fn render_detail_text(detail: &PipelineDetail) -> String {
    let record = &detail.record;
    let mut out = String::new();
    let _ = writeln!(out, "Pipeline: {}", record.name);
    let _ = writeln!(
        out,
        "Accuracy: {}  Schema accuracy: {}  Total tests: {}  Wrong matches: {}",
        format_pct(record.metrics.accuracy, 2),
        format_pct(record.metrics.schema_accuracy, 2),
        record.effective_total_tests(),
        detail.mismatch_count
    );
    if detail.mismatches().is_empty() {
        let _ = writeln!(out, "All predictions were correct");
        return out;
    }
    let _ = writeln!(out, "{}", MISMATCH_HEADERS.join(" | "));
    for entry in detail.mismatches() {
        let _ = writeln!(out, "{}", mismatch_cells(entry).join(" | "));
    }
    out
}

/// Message and exit code for an error that reached the top level.
pub fn report(err: &anyhow::Error) -> (String, u8) {
    match err.downcast_ref::<FetchError>() {
        Some(fetch @ FetchError::Validation(_)) => (fetch.user_message(), 2),
        Some(fetch @ FetchError::NotFound(_)) => (fetch.user_message(), 3),
        Some(fetch) => (fetch.user_message(), 1),
        None => (format!("{err:#}"), 1),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    print_text(&format!("{text}\n"))
}

fn print_text(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Stderr logging for one-shot commands; the TUI logs to a file instead.
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    if to_file {
        let log_dir = default_data_dir()
            .unwrap_or_else(|_| std::env::temp_dir().join("plb"))
            .join("logs");
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("creating log dir {}", log_dir.display()))?;
        let file_appender = tracing_appender::rolling::daily(&log_dir, "plb.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(non_blocking)
            .try_init();
        info!(log_dir = %log_dir.display(), "tracing_initialized");
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("com", "pipeline-leaderboard", "plb")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("no home directory for the data dir")
}
