#![warn(missing_docs)]
//! perfplan Runner
//!
//! Executes test plans and provides the `perfplan` command line:
//! - [`Executor`]: notify-start → run → notify-complete for one unit
//! - [`PlanRunner`]: setup, concurrent unit execution and report assembly
//! - [`Plugin`] / [`PluginSet`]: lifecycle observers with isolated hook delivery
//! - [`PerfConfig`]: `perfplan.toml` discovery and defaults
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = perfplan_runner::run() {
//!         eprintln!("Error: {:#}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod error;
mod executor;
mod planner;
mod plugins;

pub use config::{CONFIG_FILE, PerfConfig, RunnerConfig};
pub use error::RunnerError;
pub use executor::{
    CASE_NAME, Executor, PlanOutcome, PlanRunner, PlanSettings, SUITE_NAME, format_human_output,
};
pub use planner::{PlanEntry, TestPlan, TestUnit, build_units};
pub use plugins::{
    DataReporterPlugin, MetricReporterPlugin, Plugin, PluginBuilder, PluginError, PluginOptions,
    PluginSet, RuntimeScope, builtin_plugin, validate_options,
};

use clap::{Parser, Subcommand};
use perfplan_core::{
    DriverConfig, Engine, HarnessError, MonotonicClock, Registry, SimulatedEngine, engine_factory,
};
use perfplan_report::generate_json_report;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// perfplan CLI arguments
#[derive(Parser, Debug)]
#[command(name = "perfplan")]
#[command(author, version, about = "perfplan - pluggable latency and stress test harness")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter test units (`<engine>_<test_type>`) by regex pattern
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Measured iterations per test unit
    #[arg(long, short = 'n')]
    pub iterations: Option<usize>,

    /// Warm-up trades before each unit
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Number of engines tested concurrently
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Output format: human, json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (perfplan.toml is discovered otherwise)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the plan's test units and registered components
    List,
    /// Run the plan (default)
    Run,
}

/// Report format accepted by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Human,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(ReportFormat::Human),
            "json" => Ok(ReportFormat::Json),
            other => Err(anyhow::anyhow!("Unknown output format: {}", other)),
        }
    }
}

/// Run the perfplan CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` when every test case passed.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the perfplan CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        "perfplan=debug,perfplan_core=debug,perfplan_runner=debug,perfplan_report=debug"
    } else {
        "perfplan=info,perfplan_core=info,perfplan_runner=info,perfplan_report=info"
    };
    // A subscriber may already be installed by an embedding binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = match &cli.config {
        Some(path) => PerfConfig::load(path)?,
        None => PerfConfig::discover().unwrap_or_default(),
    };
    let registry = builtin_registry(&config)?;

    match cli.command {
        Some(Commands::List) => list_plan(&cli, &config, &registry),
        Some(Commands::Run) | None => run_plan(&cli, &config, &registry),
    }
}

/// Registry with the simulated Alpha/Beta engines, their drivers and the
/// latency and stress strategies configured from `config`
pub fn builtin_registry(config: &PerfConfig) -> Result<Registry, HarnessError> {
    let mut registry = Registry::with_default_strategies(
        config.latency,
        config.stress,
        Arc::new(MonotonicClock::new()),
    );

    let warmup = config.runner.warmup_trades;
    for profile in [SimulatedEngine::alpha, SimulatedEngine::beta] {
        let name = profile().name().to_string();
        registry.register_engine(engine_factory(name.as_str(), move || {
            Box::new(profile()) as Box<dyn Engine>
        }))?;
        let driver_engine = name.clone();
        registry.register_driver(format!("driver_{}", name), move || {
            DriverConfig::for_engine(driver_engine.as_str()).with_warmup(warmup)
        });
    }

    Ok(registry)
}

/// Build plugins from the `[plugins.<name>]` config tables
pub fn plugins_from_config(config: &PerfConfig) -> Result<PluginSet, PluginError> {
    let builders: Vec<PluginBuilder> = config
        .plugins
        .iter()
        .map(|(name, options)| {
            let name = name.clone();
            let options = options.clone();
            Box::new(move || builtin_plugin(&name, &options)) as PluginBuilder
        })
        .collect();
    PluginSet::build(builders)
}

fn selected_units(cli: &Cli, config: &PerfConfig) -> anyhow::Result<Vec<TestUnit>> {
    let filter = Regex::new(&cli.filter)?;
    Ok(build_units(&config.plan, Some(&filter)))
}

fn list_plan(cli: &Cli, config: &PerfConfig, registry: &Registry) -> anyhow::Result<()> {
    let units = selected_units(cli, config)?;

    println!("perfplan Plan: {}", config.plan.name);
    let mut current_engine: Option<&str> = None;
    for unit in &units {
        if current_engine != Some(unit.engine.as_str()) {
            println!("├── engine: {}", unit.engine);
            current_engine = Some(unit.engine.as_str());
        }
        println!("│   ├── {}", unit.id);
    }
    println!("{} test units found.", units.len());

    println!("Engines: {}", registry.list_engines().join(", "));
    println!("Drivers: {}", registry.list_drivers().join(", "));
    println!("Strategies: {}", registry.list_strategies().join(", "));
    Ok(())
}

fn run_plan(cli: &Cli, config: &PerfConfig, registry: &Registry) -> anyhow::Result<()> {
    let format: ReportFormat = cli.format.parse()?;
    let units = selected_units(cli, config)?;

    if units.is_empty() {
        println!("No test units matched '{}'.", cli.filter);
        return Ok(());
    }

    let settings = PlanSettings {
        iterations: cli.iterations.unwrap_or(config.runner.iterations),
        jobs: cli.jobs.unwrap_or(config.runner.jobs).max(1),
        warmup_trades: cli.warmup,
        show_progress: !cli.no_progress,
    };
    eprintln!(
        "Running {} test units, {} iterations each, {} job(s)...\n",
        units.len(),
        settings.iterations,
        settings.jobs
    );

    let plugins = plugins_from_config(config)?;
    let outcome = PlanRunner::new(registry, &plugins, settings).run(&config.plan.name, &units)?;
    drop(plugins.into_plugins());

    let output = match format {
        ReportFormat::Json => generate_json_report(&outcome.report)?,
        ReportFormat::Human => format_human_output(&outcome.report),
    };

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if !outcome.is_success() {
        anyhow::bail!(
            "{} test unit(s) failed: {}",
            outcome.failed_units.len(),
            outcome.failed_units.join(", ")
        );
    }

    Ok(())
}
