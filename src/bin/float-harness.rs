//! Float Harness CLI
//!
//! ## Commands
//!
//! - `check`: probe every service and validate configuration
//! - `test`: probe every service and run the end-to-end conversation
//! - `run`: precheck the agent's dependencies, then run the full pass
//! - `load`: load sample float data into the relational store

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use float_harness::flow::{FlowOutcome, FlowTester};
use float_harness::health::reporter::format_table;
use float_harness::health::{HealthProber, ReadinessReport, ReadinessWalker};
use float_harness::preflight::{self, ProcessEnv, default_artifacts, default_requirements};
use float_harness::registry::ServiceRegistry;
use float_harness::sample_data::{LoadOutcome, SampleDataLoader};
use float_harness::{ExitPolicy, HarnessConfig, HarnessError, ReportAggregator, build_info, telemetry};
use tokio::sync::OnceCell;
use tracing::{Level, error, info, warn};
use uuid::Uuid;

/// Store connection opened lazily by commands that load sample data
///
/// Held outside the interruptible command so it can be closed on Ctrl-C.
type Store = OnceCell<SampleDataLoader>;

#[derive(Parser)]
#[command(name = "float-harness")]
#[command(version, long_version = build_info::long_version())]
#[command(about = "Readiness and integration checks for the float-chat services", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Configuration profile (default: HARNESS_PROFILE or "local")
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every service and validate environment keys and artifacts
    Check,

    /// Probe every service and run the end-to-end conversation test
    Test,

    /// Precheck dependencies, then run the full readiness pass
    Run {
        /// Skip the tool-server and agent precheck
        #[arg(long)]
        skip_checks: bool,

        /// Load sample data before probing
        #[arg(long)]
        load_sample: bool,
    },

    /// Load sample float data, replacing the table contents
    Load {
        /// Parquet dataset (default: from configuration)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Maximum number of rows to load
        #[arg(long)]
        cap: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json, level);

    let store = Store::new();

    let code = tokio::select! {
        result = run(cli, &store) => match result {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                error!(error = %e, "command failed");
                eprintln!("{} {:#}", "error:".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, in-flight work abandoned");
            ExitCode::FAILURE
        }
    };

    // An abandoned load transaction rolls back as its connection is released
    if let Some(loader) = store.get() {
        loader.close().await;
    }

    code
}

async fn run(cli: Cli, store: &Store) -> Result<u8> {
    let config = match &cli.profile {
        Some(profile) => HarnessConfig::load(profile),
        None => HarnessConfig::load_from_env(),
    }
    .map_err(HarnessError::from)
    .context("Failed to load harness configuration")?;
    info!(profile = %config.profile, "configuration loaded");

    let client = reqwest::Client::builder()
        .build()
        .map_err(HarnessError::from)
        .context("Failed to build HTTP client")?;
    let walker = ReadinessWalker::new(HealthProber::with_client(
        client.clone(),
        config.timeouts.probe(),
    ));

    match cli.command {
        Commands::Check => cmd_check(&config, &walker).await,
        Commands::Test => cmd_test(&config, &walker, client).await,
        Commands::Run {
            skip_checks,
            load_sample,
        } => cmd_run(&config, &walker, client, store, skip_checks, load_sample).await,
        Commands::Load { dataset, cap } => cmd_load(&config, store, dataset, cap).await,
    }
}

async fn cmd_check(config: &HarnessConfig, walker: &ReadinessWalker) -> Result<u8> {
    let registry = ServiceRegistry::from_config(config)?;
    let readiness = walker.walk(&registry).await;

    let env_check = preflight::validate(
        &default_requirements(),
        &ProcessEnv,
        &default_artifacts(config),
    );

    let verdict = ReportAggregator::new(ExitPolicy::ReadinessAndConfig, &readiness)
        .config(&env_check)
        .finish();
    println!("{}", verdict.summary_text);

    Ok(exit_code(verdict.exit_code))
}

async fn cmd_test(
    config: &HarnessConfig,
    walker: &ReadinessWalker,
    client: reqwest::Client,
) -> Result<u8> {
    let registry = ServiceRegistry::from_config(config)?;
    let readiness = walker.walk(&registry).await;
    let flow = run_flow(config, &registry, &readiness, client).await?;

    let verdict = ReportAggregator::new(ExitPolicy::ReadinessOnly, &readiness)
        .flow(&flow)
        .finish();
    println!("{}", verdict.summary_text);
    print_flow_summary(&flow);

    Ok(exit_code(verdict.exit_code))
}

async fn cmd_run(
    config: &HarnessConfig,
    walker: &ReadinessWalker,
    client: reqwest::Client,
    store: &Store,
    skip_checks: bool,
    load_sample: bool,
) -> Result<u8> {
    if skip_checks {
        warn!("dependency precheck skipped");
    } else {
        let dependencies = ServiceRegistry::flow_dependencies(config)?;
        let precheck = walker.walk(&dependencies).await;
        if !precheck.all_reachable() {
            println!("{}", format_table(&precheck.rows()));
            return Err(HarnessError::FatalSetup(format!(
                "start missing services: {}",
                precheck.unreachable().join(", ")
            ))
            .into());
        }
        info!("dependencies reachable");
    }

    let env_check = preflight::validate(
        &default_requirements(),
        &ProcessEnv,
        &default_artifacts(config),
    );

    let load = if load_sample {
        Some(load_sample_data(config, store, None, None).await)
    } else {
        None
    };

    let registry = ServiceRegistry::from_config(config)?;
    let readiness = walker.walk(&registry).await;
    let flow = run_flow(config, &registry, &readiness, client).await?;

    let verdict = ReportAggregator::new(ExitPolicy::ReadinessOnly, &readiness)
        .config(&env_check)
        .load(load.as_ref())
        .flow(&flow)
        .finish();
    println!("{}", verdict.summary_text);

    Ok(exit_code(verdict.exit_code))
}

async fn cmd_load(
    config: &HarnessConfig,
    store: &Store,
    dataset: Option<PathBuf>,
    cap: Option<usize>,
) -> Result<u8> {
    let outcome = load_sample_data(config, store, dataset, cap).await;
    println!("{}", format_table(&[outcome.row()]));

    match outcome.error {
        None => Ok(0),
        Some(error) => Err(anyhow::anyhow!(error).context("Sample data load failed")),
    }
}

/// Connects on first use and loads; connection failures become an outcome
async fn load_sample_data(
    config: &HarnessConfig,
    store: &Store,
    dataset: Option<PathBuf>,
    cap: Option<usize>,
) -> LoadOutcome {
    let dataset = dataset.unwrap_or_else(|| config.sample_data.dataset_path.clone());
    let cap = cap.unwrap_or(config.sample_data.row_cap);

    let connect = || SampleDataLoader::connect(&config.sample_data.database_url);
    let loader = match store.get_or_try_init(connect).await {
        Ok(loader) => loader,
        Err(e) => {
            error!(error = %e, "relational store unavailable");
            return LoadOutcome::failed(0, e);
        }
    };

    loader.load(&dataset, cap).await
}

async fn run_flow(
    config: &HarnessConfig,
    registry: &ServiceRegistry,
    readiness: &ReadinessReport,
    client: reqwest::Client,
) -> Result<FlowOutcome> {
    let tester = FlowTester::from_registry(client, registry, config.timeouts.clone())?;
    let session_id = format!("harness-{}", Uuid::new_v4());
    Ok(tester.run_gated(readiness, &session_id).await)
}

fn print_flow_summary(flow: &FlowOutcome) {
    let FlowOutcome::Completed(summary) = flow else {
        return;
    };

    println!("{}", "Conversation".bold().underline());
    for turn in &summary.turns {
        println!("  Q: {}", turn.query);
        if turn.response.is_empty() {
            println!("  A: {}", "(no response)".dimmed());
        } else {
            println!("  A: {}", turn.response);
        }
        for suggestion in &turn.follow_up_suggestions {
            println!("     → {}", suggestion);
        }
    }
    if let Some(count) = summary.tool_count {
        println!("  Tools available: {}", count);
    }
    if let Some(total) = summary.total_embeddings {
        println!("  Embeddings indexed: {}", total);
    }
}

fn exit_code(code: i32) -> u8 {
    if code == 0 { 0 } else { 1 }
}
