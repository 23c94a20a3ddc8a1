//! NEXUS command-line driver.
//!
//! Provides the `nexus` binary:
//!
//! - `run` executes one JSON request against a JSON model and prints the
//!   outcome (new model plus trace) as JSON.
//! - `demo` prints a built-in scenario as a text trace.
//! - `check` runs the seeded property harness.
//!
//! Logging goes to stderr through `tracing-subscriber`, filtered by
//! `NEXUS_LOG` (default `warn`). `NEXUS_STEP_LIMIT` overrides the engine's
//! per-operation step cap.

mod demo;

use std::fs;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nexus_core::{StructureModel, Trace};
use nexus_engine::verify::property::{run_property_checks, PropertyRunConfig};
use nexus_engine::{Engine, EngineConfig, EngineError, OperationRequest};

use demo::Scenario;

/// Step-by-step traces of classic data structure algorithms.
#[derive(Parser)]
#[command(name = "nexus", about = "Step-by-step data structure algorithm traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a request against a model and print the outcome as JSON.
    Run {
        /// Path to the model JSON file.
        #[arg(short, long)]
        model: String,

        /// Path to the request JSON file.
        #[arg(short, long)]
        request: String,

        /// Print only the trace as text instead of the full outcome JSON.
        #[arg(long)]
        text: bool,
    },
    /// Print a built-in scenario as a text trace.
    Demo {
        #[arg(value_enum)]
        scenario: Scenario,
    },
    /// Run random operation sequences and check every invariant.
    Check {
        /// Random seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Independent runs per structure family.
        #[arg(short, long, default_value_t = 16)]
        iterations: u32,

        /// Operations per run.
        #[arg(short, long, default_value_t = 64)]
        ops: u32,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NEXUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match engine_config() {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(3);
        }
    };
    let engine = Engine::new(config);

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Run {
            model,
            request,
            text,
        } => run_request(&engine, &model, &request, text),
        Commands::Demo { scenario } => run_demo(&engine, scenario),
        Commands::Check {
            seed,
            iterations,
            ops,
        } => run_check(&engine, seed, iterations, ops),
    };
    process::exit(exit_code);
}

/// Engine configuration from the environment.
fn engine_config() -> Result<EngineConfig, String> {
    match std::env::var("NEXUS_STEP_LIMIT") {
        Ok(raw) => raw
            .parse()
            .map(EngineConfig::with_step_limit)
            .map_err(|e| format!("invalid NEXUS_STEP_LIMIT '{}': {}", raw, e)),
        Err(_) => Ok(EngineConfig::default()),
    }
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 = success, 1 = engine error, 3 = I/O or parse error.
fn run_request(engine: &Engine, model_path: &str, request_path: &str, text: bool) -> i32 {
    let model: StructureModel = match read_json(model_path) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };
    let request: OperationRequest = match read_json(request_path) {
        Ok(r) => r,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    match engine.execute(&model, &request) {
        Ok(outcome) if text => {
            print_trace(&outcome.trace);
            0
        }
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: failed to serialize outcome: {}", e);
                3
            }
        },
        Err(EngineError::InvalidModel(e)) => {
            eprintln!("Invalid model: {}", e);
            1
        }
        Err(e) => {
            eprintln!("Engine error: {}", e);
            1
        }
    }
}

/// Execute the demo subcommand.
fn run_demo(engine: &Engine, scenario: Scenario) -> i32 {
    match demo::run(engine, scenario) {
        Ok(traces) => {
            for (title, trace) in traces {
                println!("== {}", title);
                print_trace(&trace);
                println!();
            }
            0
        }
        Err(e) => {
            eprintln!("Engine error: {}", e);
            1
        }
    }
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = every invariant held, 1 = engine error,
/// 2 = invariant violations found.
fn run_check(engine: &Engine, seed: u64, iterations: u32, operations: u32) -> i32 {
    let config = PropertyRunConfig {
        iterations,
        operations,
        random_seed: seed,
        ..PropertyRunConfig::default()
    };
    let report = match run_property_checks(engine, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Engine error: {}", e);
            return 1;
        }
    };

    if report.passed() {
        println!(
            "{} operations checked (seed {}): all invariants hold",
            report.total_operations, report.random_seed
        );
        return 0;
    }
    eprintln!(
        "{} failing run(s) in {} operations (seed {}):",
        report.failures.len(),
        report.total_operations,
        report.random_seed
    );
    for failure in &report.failures {
        eprintln!(
            "  - {:?} iteration {} after {} request(s):",
            failure.family,
            failure.iteration,
            failure.history.len()
        );
        for violation in &failure.violations {
            eprintln!("      {:?}: {}", violation.kind, violation.message);
        }
    }
    2
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let raw = fs::read_to_string(Path::new(path))
        .map_err(|e| format!("failed to read '{}': {}", path, e))?;
    serde_json::from_str(&raw).map_err(|e| format!("failed to parse '{}': {}", path, e))
}

fn print_trace<M>(trace: &Trace<M>) {
    for step in trace.iter() {
        let highlighted = step
            .highlighted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:>4}  {:<16} {:<12} {}",
            step.index,
            step.phase.as_str(),
            highlighted,
            step.description
        );
    }
}
