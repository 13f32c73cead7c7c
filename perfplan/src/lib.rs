#![warn(missing_docs)]
//! # perfplan
//!
//! Pluggable performance-test harness: runs test strategies (latency, stress)
//! against swappable engine implementations, reduces the raw timings into
//! summaries and notifies plugins at defined lifecycle points.
//!
//! - **Engines**: anything implementing [`Engine`]; the stress probe is an optional capability
//! - **Strategies**: two-phase `run` / `analyze`, stateless and shared across engines
//! - **Registry**: explicit value holding engine, driver and strategy constructors
//! - **Executor**: notify-start → run → notify-complete, with plugin isolation
//! - **Plan runner**: distinct engines tested concurrently, units of one engine in order
//! - **Aggregation**: depth-first walk of the report tree into per-case summaries
//!
//! ## Quick Start
//!
//! ```ignore
//! use perfplan::prelude::*;
//!
//! let config = PerfConfig::default();
//! let registry = builtin_registry(&config)?;
//! let plugins = plugins_from_config(&config)?;
//! let units = build_units(&config.plan, None);
//!
//! let outcome = PlanRunner::new(&registry, &plugins, PlanSettings::default())
//!     .run(&config.plan.name, &units)?;
//! println!("{}", format_human_output(&outcome.report));
//! ```

// Re-export core types
pub use perfplan_core::{
    CPU_SERIES, Cancellation, Capability, Clock, DEFAULT_WARMUP_TRADES, DriverConfig, Engine,
    EngineError, EngineFactory, HarnessError, IO_SERIES, LATENCIES_NS, LatencyConfig,
    LatencyStrategy, MEMORY_SERIES, ManualClock, MonotonicClock, OperationKind, OperationProbe,
    Order, RawResult, Registry, RegistryKind, ScriptedEngine, SimulatedEngine, Strategy,
    StressConfig, StressStrategy, Timer, TradeOutcome, engine_factory, ensure_capabilities,
    warm_up,
};

// Re-export report types
pub use perfplan_report::{
    AggregateSummary, Assertion, CaseEntry, CaseResult, CaseSummary, NodeCategory, NodeStatus,
    OutputFormat, RawValue, ReportNode, ReportTree, ResultSink, ValueMap, generate_json_report,
    render_summary, summarize_report,
};

// Re-export runner
pub use perfplan_runner::{
    Cli, DataReporterPlugin, Executor, MetricReporterPlugin, PerfConfig, PlanEntry, PlanOutcome,
    PlanRunner, PlanSettings, Plugin, PluginBuilder, PluginError, PluginOptions, PluginSet,
    RunnerError, RuntimeScope, TestPlan, TestUnit, build_units, builtin_registry,
    format_human_output, plugins_from_config, run, run_with_cli,
};

// Re-export stats
pub use perfplan_stats::{SeriesSummary, compute_percentile, compute_summary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Cancellation, Engine, Executor, LatencyStrategy, PerfConfig, PlanRunner, PlanSettings,
        Plugin, PluginSet, Registry, ResultSink, Strategy, StressStrategy, build_units,
        builtin_registry, format_human_output, plugins_from_config,
    };
}
