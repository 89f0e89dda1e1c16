//! cablepath - Topology path tracing CLI
//!
//! Operator tooling over a topology file: trace a single endpoint, rebuild
//! the path cache in bulk, or validate a record set.

use anyhow::Result;
use cablepath::{
    CablePathEngine, Config, Endpoint, EndpointKind, FileTopologyStore, PathEngine,
    TopologySnapshot, TopologyStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cablepath")]
#[command(about = "Physical topology path tracer")]
struct Cli {
    /// Topology records file (YAML, or JSON by extension)
    #[arg(short, long, env = "CABLEPATH_TOPOLOGY", global = true, default_value = "topology.yaml")]
    topology: PathBuf,

    /// Config file path (defaults to config.yaml in CWD)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the full path from one endpoint (e.g. "interface:17")
    Trace {
        /// Origin endpoint as kind:id
        endpoint: Endpoint,
    },

    /// Rebuild paths for every cabled terminal endpoint and print a report
    Retrace {
        /// Restrict origins to these kinds (repeatable)
        #[arg(long = "kind")]
        kinds: Vec<EndpointKind>,
    },

    /// Validate the topology file and print summary statistics
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cablepath=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let store = Arc::new(FileTopologyStore::new(&cli.topology));

    match cli.command {
        Commands::Trace { endpoint } => run_trace(store, config, endpoint).await,
        Commands::Retrace { kinds } => run_retrace(store, config, kinds).await,
        Commands::Check => run_check(store).await,
    }
}

async fn run_trace(
    store: Arc<FileTopologyStore>,
    config: Config,
    endpoint: Endpoint,
) -> Result<()> {
    let engine = CablePathEngine::new(store, config.trace);
    let path = engine.trace_endpoint(endpoint).await?;

    tracing::info!(
        origin = %path.origin,
        branches = path.branches.len(),
        split = path.is_split,
        active = path.is_active,
        "Trace complete"
    );
    println!("{}", serde_json::to_string_pretty(&path)?);
    Ok(())
}

async fn run_retrace(
    store: Arc<FileTopologyStore>,
    config: Config,
    kinds: Vec<EndpointKind>,
) -> Result<()> {
    let engine = CablePathEngine::new(store, config.trace);
    let kinds = if kinds.is_empty() { None } else { Some(kinds) };
    let report = engine.retrace_all(kinds).await?;

    tracing::info!(
        "Retrace complete: {} paths created, {} deleted, {} origins skipped, {} failed",
        report.created,
        report.deleted,
        report.skipped,
        report.failed.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_check(store: Arc<FileTopologyStore>) -> Result<()> {
    let records = store.load_records().await?;
    let snapshot = TopologySnapshot::from_records(&records)?;

    let origins = snapshot.cabled_origins(None);
    tracing::info!(
        endpoints = snapshot.endpoint_count(),
        cables = snapshot.cable_count(),
        pass_throughs = snapshot.pass_through_count(),
        cabled_origins = origins.len(),
        "Topology OK"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "endpoints": snapshot.endpoint_count(),
            "cables": snapshot.cable_count(),
            "pass_throughs": snapshot.pass_through_count(),
            "cabled_origins": origins,
        }))?
    );
    Ok(())
}
