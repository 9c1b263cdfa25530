//! Spot - parameterized shell benchmark runners
//!
//! The `spot` command loads runner definitions from the data directory,
//! executes them over every parameter combination and optionally uploads
//! the results to a collector.
//!
//! ## Commands
//!
//! - `list`: Show local runner definitions
//! - `show`: Print a merged definition with its uid and parameters
//! - `run`: Execute a runner and print its facts
//! - `submit`: Register a runner with the collector
//! - `remote`: List runners known to the collector

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use spot_client::CollectorClient;
use spot_core::{FailurePolicy, Fact, Loader, RunnerDefinition, SpotConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "spot")]
#[command(author = "Spot Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parameterized shell benchmark runners", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding runner definitions
    #[arg(long, global = true, env = "SPOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Collector base URL
    #[arg(long, global = true, env = "SPOT_HOST")]
    host: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List local runner definitions
    List,

    /// Show a runner definition after inheritance is resolved
    Show {
        /// Definition name
        name: String,
    },

    /// Execute a runner over every parameter combination
    Run {
        /// Definition name
        name: String,

        /// Parameter binding, e.g. `-p size=1:1024:5`
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Record failed steps and continue with the next assignment
        #[arg(long)]
        keep_going: bool,

        /// Upload the runner and its facts to the collector
        #[arg(long)]
        submit: bool,
    },

    /// Register a runner definition with the collector
    Submit {
        /// Definition name
        name: String,
    },

    /// List runners known to the collector
    Remote,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    spot_core::init_tracing(cli.json, level);

    let mut config = SpotConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(host) = cli.host.as_deref() {
        config = config.with_collector_url(host);
    }

    match cli.command {
        Commands::List => cmd_list(&config),
        Commands::Show { name } => cmd_show(&config, &name),
        Commands::Run {
            name,
            params,
            keep_going,
            submit,
        } => cmd_run(&config, &name, &params, keep_going, submit).await,
        Commands::Submit { name } => cmd_submit(&config, &name).await,
        Commands::Remote => cmd_remote(&config).await,
    }
}

/// Output of `spot show`.
#[derive(Serialize)]
struct RunnerSummary<'a> {
    name: &'a str,
    uid: &'a str,
    parameters: Vec<ParameterSummary<'a>>,
    definition: &'a RunnerDefinition,
}

#[derive(Serialize)]
struct ParameterSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_name: &'static str,
}

/// Parse repeated `key=value` arguments.
fn parse_params(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{}', expected KEY=VALUE", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid parameter '{}', empty key", pair);
        }
        if params.insert(key.to_string(), value.to_string()).is_some() {
            bail!("Parameter '{}' given more than once", key);
        }
    }
    Ok(params)
}

/// Leading twelve characters of a uid, or the whole uid if it is shorter.
fn short_uid(uid: &str) -> &str {
    match uid.char_indices().nth(12) {
        Some((end, _)) => &uid[..end],
        None => uid,
    }
}

/// List local runner definitions
fn cmd_list(config: &SpotConfig) -> Result<()> {
    let loader = Loader::from_config(config);
    let names = loader.list_all().context("Failed to list runner definitions")?;

    if names.is_empty() {
        println!("No runners found in {}", loader.data_dir().display());
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }

    Ok(())
}

/// Show a merged definition
fn cmd_show(config: &SpotConfig, name: &str) -> Result<()> {
    let runner = Loader::from_config(config)
        .load(name)
        .with_context(|| format!("Failed to load runner '{}'", name))?;

    let summary = RunnerSummary {
        name,
        uid: runner.uid(),
        parameters: runner
            .parameters()
            .iter()
            .map(|(name, ty)| ParameterSummary {
                name,
                type_name: ty.name(),
            })
            .collect(),
        definition: runner.definition(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Execute a runner and print its facts
async fn cmd_run(
    config: &SpotConfig,
    name: &str,
    pairs: &[String],
    keep_going: bool,
    submit: bool,
) -> Result<()> {
    let facts = run_runner(config, name, pairs, keep_going).await?;
    println!("{}", serde_json::to_string_pretty(&facts)?);

    if submit {
        let definition = Loader::from_config(config).load_data(name)?;
        let client = CollectorClient::from_config(config)?;
        client
            .submit_runner(&definition)
            .await
            .context("Failed to submit runner")?;
        if let Some(uid) = facts.first().map(|f| f.runner_uid.as_str()) {
            client
                .submit_facts(uid, &facts)
                .await
                .context("Failed to submit facts")?;
        }
        info!("Submitted {} facts to {}", facts.len(), client.base_url());
    }

    Ok(())
}

async fn run_runner(
    config: &SpotConfig,
    name: &str,
    pairs: &[String],
    keep_going: bool,
) -> Result<Vec<Fact>> {
    let params = parse_params(pairs)?;
    let policy = if keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let runner = Loader::from_config(config)
        .load(name)
        .with_context(|| format!("Failed to load runner '{}'", name))?
        .with_failure_policy(policy);

    runner
        .execute(&params)
        .await
        .with_context(|| format!("Runner '{}' failed", name))
}

/// Register a runner definition with the collector
async fn cmd_submit(config: &SpotConfig, name: &str) -> Result<()> {
    let runner = Loader::from_config(config)
        .load(name)
        .with_context(|| format!("Failed to load runner '{}'", name))?;
    let client = CollectorClient::from_config(config)?;

    client
        .submit_runner(runner.definition())
        .await
        .context("Failed to submit runner")?;

    println!("Submitted '{}' as {}", name, runner.uid());

    Ok(())
}

/// List runners registered with the collector
async fn cmd_remote(config: &SpotConfig) -> Result<()> {
    let client = CollectorClient::from_config(config)?;
    let runners = client
        .list_runners()
        .await
        .with_context(|| format!("Failed to query {}", client.base_url()))?;

    if runners.is_empty() {
        println!("No runners registered at {}", client.base_url());
        return Ok(());
    }

    for (uid, definition) in runners {
        println!(
            "{}  {} ({})",
            short_uid(&uid),
            definition.version_command,
            definition.version
        );
    }

    Ok(())
}
