/*!
 * Lifespan Simulator - Main Entry Point
 *
 * Drives synthetic server workloads against the allocator:
 * - base: heap alloc/free per request
 * - arena: transient arena per request
 * - hybrid: slab sessions, scratch arenas, persistent cache
 */

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use lifespan_alloc::{
    init_tracing, run_scenario, simulation::render_table, Engine, HeapConfig, Scenario,
    WorkloadConfig, WorkloadReport,
};

/// Scenario selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioChoice {
    Base,
    Arena,
    Hybrid,
    /// Every scenario, in order
    All,
}

impl ScenarioChoice {
    fn scenarios(self) -> Vec<Scenario> {
        match self {
            ScenarioChoice::Base => vec![Scenario::Base],
            ScenarioChoice::Arena => vec![Scenario::Arena],
            ScenarioChoice::Hybrid => vec![Scenario::Hybrid],
            ScenarioChoice::All => Scenario::ALL.to_vec(),
        }
    }
}

/// Allocator workload simulator
#[derive(Debug, Parser)]
#[command(name = "lifespan-sim")]
#[command(about = "Run synthetic allocation workloads against the lifespan allocator")]
struct Cli {
    /// Scenario to run
    #[arg(value_enum, ignore_case = true, default_value_t = ScenarioChoice::All)]
    scenario: ScenarioChoice,

    /// Requests (base/arena) or operations (hybrid)
    #[arg(long)]
    requests: Option<usize>,

    /// RNG seed for the hybrid scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Heap region size in bytes (overrides LIFESPAN_HEAP_SIZE)
    #[arg(long)]
    heap_size: Option<usize>,

    /// Record allocation lifespans to the telemetry log
    #[arg(long)]
    profile: bool,

    /// Telemetry log path used with --profile
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn heap_config(&self) -> HeapConfig {
        let mut config = HeapConfig::from_env();
        if let Some(size) = self.heap_size {
            config = config.with_heap_size(size);
        }
        if self.profile {
            config = config.with_profiling(true);
        }
        if let Some(path) = &self.telemetry {
            config = config.with_telemetry_path(path.clone());
        }
        config
    }

    fn workload(&self, scenario: Scenario) -> WorkloadConfig {
        let mut workload = WorkloadConfig::default();
        if scenario == Scenario::Hybrid {
            workload = workload.with_requests(WorkloadConfig::HYBRID_OPERATIONS);
        }
        if let Some(requests) = self.requests {
            workload = workload.with_requests(requests);
        }
        if let Some(seed) = self.seed {
            workload = workload.with_seed(seed);
        }
        workload
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let scenarios = cli.scenario.scenarios();
    let heap_config = cli.heap_config();
    info!(
        heap_size = heap_config.heap_size,
        profiling = heap_config.profiling,
        "Starting lifespan simulator"
    );

    let mut reports: Vec<WorkloadReport> = Vec::with_capacity(scenarios.len());
    let mut engine = Engine::init(&heap_config)?;
    for scenario in scenarios {
        let report = run_scenario(&mut engine, scenario, &cli.workload(scenario))?;
        info!(
            scenario = %report.scenario,
            elapsed_ms = report.elapsed_ms,
            "Scenario finished"
        );
        reports.push(report);
    }
    engine.heap_mut().flush_telemetry()?;

    let stats = engine.heap().stats()?;
    info!(
        blocks = stats.block_count,
        free_blocks = stats.free_blocks,
        fragmentation = stats.fragmentation(),
        "Final heap state"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", render_table(&reports));
    }
    Ok(())
}
