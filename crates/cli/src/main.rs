//! Dataloom CLI — ask one data-analysis question from the command line.
//!
//! ```text
//! dataloom "What is the average order value?" --csv orders.csv:orders
//! ```
//!
//! Datasets named with `--csv` are loaded before the run; the agent can also
//! load more itself via the `load_csv` tool.

use anyhow::{Context, bail};
use clap::Parser;
use dataloom_agent::AnalyticsAgent;
use dataloom_config::AppConfig;
use dataloom_core::provider::Provider;
use dataloom_core::retry::RetryPolicy;
use dataloom_core::run::RunStatus;
use dataloom_gateway::ModelGateway;
use dataloom_providers::GeminiProvider;
use dataloom_tools::{Dataset, DatasetStore, HttpExecutionService, default_registry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "dataloom",
    about = "Dataloom — a data-analytics agent over your CSV files",
    version
)]
struct Cli {
    /// The question to answer.
    query: String,

    /// CSV files to preload, as PATH:ALIAS pairs. Repeatable.
    #[arg(long = "csv", value_name = "PATH:ALIAS")]
    csv: Vec<String>,

    /// Path to a config file (defaults to ~/.dataloom/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full turn history after the answer.
    #[arg(long)]
    trace: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let api_key = config
        .api_key
        .clone()
        .context("no API key configured — set DATALOOM_API_KEY or add api_key to config.toml")?;

    // Preload datasets named on the command line.
    let store = Arc::new(DatasetStore::new());
    for entry in &cli.csv {
        let Some((path, alias)) = entry.rsplit_once(':') else {
            bail!("invalid --csv value '{entry}': expected PATH:ALIAS");
        };
        let dataset = Dataset::from_csv_path(path)
            .with_context(|| format!("failed to load '{path}'"))?;
        tracing::info!(alias, rows = dataset.row_count(), "preloaded dataset");
        store.insert(alias, dataset);
    }

    let mut gemini = GeminiProvider::new(api_key, &config.provider.model);
    if let Some(base_url) = &config.provider.base_url {
        gemini = gemini.with_base_url(base_url);
    }
    let provider: Arc<dyn Provider> = Arc::new(gemini);

    let executor = Arc::new(HttpExecutionService::new(&config.executor.endpoint));
    let policy = RetryPolicy::new(
        config.retry.max_retries,
        Duration::from_secs_f64(config.retry.base_delay_secs),
    );

    let registry = default_registry(
        store.clone(),
        provider.clone(),
        executor,
        policy.clone(),
    );
    let gateway = ModelGateway::new(provider)
        .with_policy(policy)
        .with_temperature(config.provider.temperature);

    let mut agent = AnalyticsAgent::new(gateway, registry, store)
        .with_max_iterations(config.agent.max_iterations)
        .with_memory_capacity(config.agent.memory_capacity)
        .with_context_window(config.agent.context_window)
        .with_summary_budget(config.agent.summary_budget);

    let result = agent.run(&cli.query).await;

    if cli.trace {
        for (i, turn) in result.turn_history.iter().enumerate() {
            println!("--- turn {} ---", i + 1);
            println!("thought: {}", turn.thought);
            println!("action:  {}", turn.action);
            println!("result:  {}", turn.result_summary);
        }
        println!();
    }

    for chart in &result.visualizations {
        println!("chart ({}): {}", chart.chart_type, chart.filepath);
    }

    match result.status {
        RunStatus::Success => {
            println!("{}", result.answer.unwrap_or_default());
            Ok(())
        }
        RunStatus::Error => {
            bail!(
                "run failed after {} iteration(s): {}",
                result.iterations_used,
                result.error.unwrap_or_else(|| "unknown error".into())
            );
        }
    }
}
