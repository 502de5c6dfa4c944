//! co2block-planner - command line front end
//!
//! Each subcommand is one step of the planning workflow. State carries over
//! between invocations through the workspace: the stored reservoir profile and
//! the simulator's output tables.
//!
//! # Usage
//!
//! ```bash
//! # Pick a reservoir from the catalog, or save hand-entered inputs
//! co2block-planner save-inputs --reservoir "Bunter Closure 36"
//! co2block-planner save-inputs --json inputs.json
//!
//! # Run CO2BLOCK and inspect the outputs
//! co2block-planner run --json limits.json
//! co2block-planner max-scenario
//!
//! # Net revenue curves from the last run or from an uploaded table
//! co2block-planner optimize --json rates.json
//! co2block-planner optimize --json rates.json --table V_M.csv
//!
//! # Example tables to start from
//! co2block-planner examples
//! ```
//!
//! # Environment Variables
//!
//! - `CO2BLOCK_CONFIG`: Path to planner_config.toml
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use co2block_planner::{
    OptimizeRequest, PlannerConfig, PlannerSession, ReservoirCatalog, RunLimits,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "co2block-planner")]
#[command(about = "CO2BLOCK storage simulation and revenue optimization planner")]
#[command(version)]
struct CliArgs {
    /// Path to planner_config.toml (overrides the CO2BLOCK_CONFIG search order)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print the reservoir catalog as JSON records
    Reservoirs,

    /// Normalize and store the reservoir profile used by the next run
    SaveInputs {
        /// JSON object with the reservoir fields
        #[arg(
            long,
            value_name = "FILE",
            conflicts_with = "reservoir",
            required_unless_present = "reservoir"
        )]
        json: Option<PathBuf>,
        /// Name of a catalog reservoir
        #[arg(long)]
        reservoir: Option<String>,
    },

    /// Run CO2BLOCK over the stored profile
    Run {
        /// JSON object with the run limits
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },

    /// List the output files of the last run
    Results,

    /// Print the maximum storage scenario of the last run
    MaxScenario,

    /// Build net revenue curves and write the optimization report
    Optimize {
        /// JSON object with readOutputs and rates
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
        /// Storage table to optimize over instead of the last run's outputs
        #[arg(long, value_name = "CSV")]
        table: Option<PathBuf>,
    },

    /// Print the last optimization report
    Report,

    /// Print the paths of the example input and storage tables
    Examples,
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(path) => PlannerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PlannerConfig::load()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Subcommands
// ============================================================================

fn save_inputs(
    session: &mut PlannerSession,
    json: Option<&Path>,
    reservoir: Option<&str>,
) -> Result<()> {
    let profile = match (json, reservoir) {
        (Some(path), _) => {
            let raw: Map<String, Value> = read_json(path)?;
            session.normalize(&raw)?
        }
        (None, Some(name)) => {
            let catalog_path = session.config().catalog_path();
            let catalog = ReservoirCatalog::load(&catalog_path)
                .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
            let profile = catalog.profile(name)?;
            session.submit_profile(profile)?
        }
        (None, None) => bail!("either --json or --reservoir is required"),
    };
    info!(name = %profile.display_name(), "Reservoir profile saved");
    print_json(profile)
}

async fn run(session: &PlannerSession, limits_path: &Path) -> Result<()> {
    let limits: RunLimits = read_json(limits_path)?;

    let cancel = CancellationToken::new();
    let shutdown_token = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        warn!("Received Ctrl+C, stopping CO2BLOCK...");
        shutdown_token.cancel();
    });

    let outcome = session.invoke(&limits, &cancel).await?;
    print_json(&outcome)?;
    if !outcome.is_success() {
        bail!("{}", outcome.describe());
    }
    Ok(())
}

fn optimize(session: &mut PlannerSession, request_path: &Path, table: Option<&Path>) -> Result<()> {
    let request: OptimizeRequest = read_json(request_path)?;
    if let Some(table_path) = table {
        let file = std::fs::File::open(table_path)
            .with_context(|| format!("Failed to open {}", table_path.display()))?;
        session.upload_table(file)?;
    }
    let report = session.optimize(&request)?;
    print_json(&report)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Reservoirs => {
            let catalog = ReservoirCatalog::load(&config.catalog_path())?;
            print_json(&catalog.records())
        }
        SubCommand::SaveInputs { json, reservoir } => {
            let mut session = PlannerSession::new(config);
            save_inputs(&mut session, json.as_deref(), reservoir.as_deref())
        }
        SubCommand::Run { json } => {
            let session = PlannerSession::resume(config)?;
            run(&session, &json).await
        }
        SubCommand::Results => {
            let session = PlannerSession::new(config);
            let artifacts = session.result_artifacts();
            if artifacts.is_empty() {
                warn!("No simulator outputs found");
            }
            print_json(&artifacts)
        }
        SubCommand::MaxScenario => {
            let session = PlannerSession::new(config);
            print_json(&session.max_scenario()?)
        }
        SubCommand::Optimize { json, table } => {
            let mut session = PlannerSession::resume(config)?;
            optimize(&mut session, &json, table.as_deref())
        }
        SubCommand::Report => {
            let session = PlannerSession::new(config);
            match session.optimization_result()? {
                Some(report) => print_json(&report),
                None => bail!("no optimization report has been written yet"),
            }
        }
        SubCommand::Examples => {
            let files = config.with_absolute_paths().example_file_paths();
            for missing in files.iter().filter(|file| !file.is_file()) {
                warn!(path = %missing.display(), "Example file not found");
            }
            print_json(&files)
        }
    }
}
