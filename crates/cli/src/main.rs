//! Taskweave CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Run one query through the workflow and print the outcome
//! - `config` — Print the effective configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use taskweave_agents::{Planner, Reflector, ToolExecutor};
use taskweave_config::AppConfig;
use taskweave_providers::OpenAiCompatProvider;
use taskweave_tools::{CalculatorTool, SearchTool, ToolRegistry};
use taskweave_tools::search::SearchApiConfig;
use taskweave_workflow::Workflow;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "taskweave",
    about = "Taskweave — plan→execute→reflect→refine agent workflows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query through the workflow
    Run {
        /// The natural-language query
        query: String,

        /// Override the iteration budget
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Print the effective configuration
    Config,
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
        Some(path) => AppConfig::load_with_overrides(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };

    match cli.command {
        Commands::Run {
            query,
            max_iterations,
        } => run_query(&config, &query, max_iterations).await,
        Commands::Config => {
            println!("{}", toml_summary(&config));
            Ok(())
        }
    }
}

async fn run_query(
    config: &AppConfig,
    query: &str,
    max_iterations: Option<u32>,
) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        bail!("Query cannot be empty");
    }

    let Some(api_key) = config.provider.api_key.clone() else {
        bail!("Missing provider API key: set TASKWEAVE_API_KEY or [provider].api_key in the config");
    };

    let provider = Arc::new(OpenAiCompatProvider::new(
        "openai-compat",
        config.provider.base_url.clone(),
        api_key,
    ));

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(match &config.search.api_key {
        Some(key) => SearchTool::hosted(SearchApiConfig {
            api_url: config.search.api_url.clone(),
            api_key: key.clone(),
        }),
        None => SearchTool::offline(),
    }));
    registry.register(Box::new(CalculatorTool));
    let registry = Arc::new(registry);

    let planner = Planner::new(provider.clone(), config.provider.model.clone(), registry.names())
        .with_temperature(config.provider.temperature);
    let reflector = Reflector::new(provider, config.provider.model.clone())
        .with_temperature(config.provider.temperature);
    let executor = ToolExecutor::new(registry);

    let workflow = Workflow::new(planner, executor, reflector);
    let budget = max_iterations.unwrap_or(config.workflow.max_iterations).max(1);

    // The run id exists only out here: the engine itself is stateless, and
    // anything tracking in-flight runs keys off an identifier it generates.
    let run_id = uuid::Uuid::new_v4();
    info!(run_id = %run_id, max_iterations = budget, "Starting run");

    let started = Instant::now();
    let outcome = workflow.run(query, budget).await;
    let elapsed = started.elapsed();

    println!("{}", outcome.response);
    eprintln!();
    eprintln!(
        "run {} {} in {:.2}s ({} task(s), {} result(s))",
        run_id,
        if outcome.success { "succeeded" } else { "failed" },
        elapsed.as_secs_f64(),
        outcome.tasks.len(),
        outcome.results.len()
    );

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn toml_summary(config: &AppConfig) -> String {
    // Never print credentials, only whether they are set.
    let mut redacted = config.clone();
    redacted.provider.api_key = None;
    redacted.search.api_key = None;
    let mut out = toml::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("<unprintable config: {e}>"));
    out.push_str(&format!(
        "\n# provider api key set: {}\n# search api key set: {}\n",
        config.provider.api_key.is_some(),
        config.search.api_key.is_some()
    ));
    out
}
