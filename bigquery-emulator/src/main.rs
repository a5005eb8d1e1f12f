use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gcloud_bigquery_emulator::config::{
    EmulatorConfig, Mode, WorkflowConfig, DEFAULT_DATASET_ID, DEFAULT_LABEL, DEFAULT_PROJECT_ID, DEFAULT_TABLE_ID,
};
use gcloud_bigquery_emulator::{workflow, Error};

#[derive(Parser)]
#[command(name = "gcloud-bigquery-emulator", about = "Create, fill and query a table on a BigQuery emulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    args: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the dataset and the table, insert the sample records and query them (default)
    Run,
    /// Only create the dataset and the table
    Provision,
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    /// Emulator address, e.g. localhost:9050
    #[arg(long, global = true, env = "BIGQUERY_EMULATOR_HOST")]
    emulator_host: Option<String>,
    #[arg(long, global = true, env = "BIGQUERY_PROJECT_ID", default_value = DEFAULT_PROJECT_ID)]
    project_id: String,
    #[arg(long, global = true, env = "BIGQUERY_DATASET_ID", default_value = DEFAULT_DATASET_ID)]
    dataset_id: String,
    #[arg(long, global = true, env = "BIGQUERY_TABLE_ID", default_value = DEFAULT_TABLE_ID)]
    table_id: String,
    /// labels.event_id value to query
    #[arg(long, global = true, default_value = DEFAULT_LABEL)]
    label: String,
    /// Timeout of the whole run in seconds
    #[arg(long, global = true, env = "BIGQUERY_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,
    /// Timeout of the dataset deletion in seconds
    #[arg(long, global = true, default_value_t = 30)]
    teardown_timeout_secs: u64,
    /// Log every response body
    #[arg(long, global = true)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gcloud_bigquery_emulator=debug")),
        )
        .init();

    let (emulator, config) = match configure(Cli::parse()) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = CancellationToken::new();
    tokio::spawn(cancel_on_signal(ctx.clone()));

    match workflow::run(ctx, &emulator, &config).await {
        Ok(outcome) => {
            tracing::info!(matched = outcome.matched.len(), "process successfully finished");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_cancelled() => {
            tracing::warn!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the command line into the run configuration, before any request is sent.
fn configure(cli: Cli) -> Result<(EmulatorConfig, WorkflowConfig), Error> {
    let mode = match cli.command {
        Some(Commands::Provision) => Mode::Provision,
        Some(Commands::Run) | None => Mode::Full,
    };
    let args = cli.args;
    let emulator = EmulatorConfig::new(args.emulator_host.unwrap_or_default())?;
    let config = WorkflowConfig::default()
        .with_project_id(args.project_id)
        .with_dataset_id(args.dataset_id)
        .with_table_id(args.table_id)
        .with_label(args.label)
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_teardown_timeout(Duration::from_secs(args.teardown_timeout_secs))
        .with_mode(mode)
        .with_debug(args.debug);
    Ok((emulator, config))
}

async fn cancel_on_signal(ctx: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, cancelling"),
        _ = terminate => tracing::info!("received SIGTERM, cancelling"),
    }
    ctx.cancel();
}
