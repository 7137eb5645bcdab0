//! balancer-sim
//!
//! Runs a load-balancing scenario and prints what happened.
//!
//! # Architecture Overview
//!
//! ```text
//!   scenario.toml ──▶ config ──▶ Router ──┬──▶ TargetGroup "v1/" ─┐
//!                       │                 └──▶ TargetGroup "v2/" ─┤  (one blocking
//!                       ▼                                         │   worker each)
//!                   workload ──▶ (request, arrival) pairs ────────┘
//!                                                                 │
//!                                                                 ▼
//!                                              report (text / JSON) + series file
//! ```

use std::path::PathBuf;

use clap::Parser;

use balancer_sim::config::{load_config, ScenarioConfig};
use balancer_sim::observability::{logging, metrics};
use balancer_sim::report::{SimulationReport, SimulationSeries};
use balancer_sim::workload::WorkloadGenerator;

#[derive(Debug, Parser)]
#[command(name = "balancer-sim", version, about = "Simulate request routing across target groups")]
struct Cli {
    /// Scenario file (TOML). The built-in reference scenario is used if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of generated requests.
    #[arg(short, long)]
    requests: Option<usize>,

    /// Send every request with a sticky session.
    #[arg(long)]
    sticky: bool,

    /// Override the scenario seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Write every recorded time series to this file as JSON.
    #[arg(long)]
    series: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ScenarioConfig::default(),
    };
    if let Some(requests) = cli.requests {
        config.workload.requests = requests;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.workload.sticky |= cli.sticky;

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("balancer-sim v{} starting", env!("CARGO_PKG_VERSION"));

    let prometheus = if config.observability.metrics_enabled {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    let mut router = config.build_router()?;
    let workload = WorkloadGenerator::new(&config.workload, &config.groups, config.seed)?.generate();
    tracing::info!(
        groups = router.len(),
        requests = workload.len(),
        sticky = config.workload.sticky,
        seed = config.seed,
        "Scenario loaded"
    );

    router.run_parallel(workload).await?;

    let report = SimulationReport::from_router(&router);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if let Some(path) = &cli.series {
        let series = SimulationSeries::from_router(&router);
        std::fs::write(path, serde_json::to_vec(&series)?)?;
        tracing::info!(path = %path.display(), "Time series written");
    }

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    Ok(())
}
