//! # caseflow CLI Entry Point
//!
//! Serves the case engine API over the in-memory reference stores, and
//! validates SLA configuration files.

use std::sync::Arc;

use clap::Parser;

use caseflow_core::{DataSourceId, SystemClock};
use caseflow_policy::{SlaConfig, SlaPolicy};
use caseflow_service::{
    CaseService, MemoryCaseStore, MemoryTaskStore, StaticScopeProvider, TracingAuditSink,
    TracingNotifier,
};

/// Caseflow — compliance case lifecycle and SLA engine.
///
/// Runs the DSR and breach-incident case engine behind its HTTP API, and
/// checks SLA window configuration for a deployment.
#[derive(Parser, Debug)]
#[command(name = "caseflow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the case engine API.
    Serve(ServeArgs),
    /// Validate an SLA configuration file.
    CheckConfig(CheckConfigArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Path to an SLA configuration YAML file; defaults apply if omitted.
    #[arg(long)]
    sla_config: Option<std::path::PathBuf>,

    /// Data sources in DSR scope for every tenant (repeatable).
    #[arg(long = "data-source")]
    data_sources: Vec<String>,
}

#[derive(clap::Args, Debug)]
struct CheckConfigArgs {
    /// Path to the SLA configuration YAML file.
    path: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::CheckConfig(args) => check_config(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let sla = load_policy(args.sla_config.as_deref())?;
    let scope = StaticScopeProvider::new(
        args.data_sources.iter().map(DataSourceId::new).collect(),
    );
    let engine = CaseService::new(
        Arc::new(MemoryCaseStore::new()),
        Arc::new(MemoryTaskStore::new()),
        Arc::new(scope),
        Arc::new(TracingAuditSink),
        Arc::new(TracingNotifier),
        Arc::new(SystemClock),
        sla,
    );
    let app = caseflow_api::router(caseflow_api::AppState::new(Arc::new(engine)));

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    tracing::info!(addr = %args.addr, "caseflow engine listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.path)?;
    let policy = SlaConfig::from_yaml(&source)?.into_policy()?;
    tracing::info!(path = %args.path.display(), "SLA configuration valid");
    println!(
        "ok: high={}d medium={}d low={}d cert_in={}h dpb={}h",
        policy.dsr_high.num_days(),
        policy.dsr_medium.num_days(),
        policy.dsr_low.num_days(),
        policy.cert_in.num_hours(),
        policy.dpb.num_hours(),
    );
    Ok(())
}

fn load_policy(path: Option<&std::path::Path>) -> anyhow::Result<SlaPolicy> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            Ok(SlaConfig::from_yaml(&source)?.into_policy()?)
        }
        None => Ok(SlaPolicy::default()),
    }
}
