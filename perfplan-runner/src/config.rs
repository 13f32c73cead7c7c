//! Configuration loading from perfplan.toml
//!
//! perfplan configuration can be specified in a `perfplan.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Every field is optional; CLI flags override file values.

use crate::planner::TestPlan;
use crate::plugins::{DataReporterPlugin, MetricReporterPlugin, PluginOptions};
use perfplan_core::{DEFAULT_WARMUP_TRADES, LatencyConfig, StressConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the discovered configuration file
pub const CONFIG_FILE: &str = "perfplan.toml";

/// perfplan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Latency strategy thresholds
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Stress strategy work sizes and thresholds
    #[serde(default)]
    pub stress: StressConfig,
    /// Engines and tests to run
    #[serde(default)]
    pub plan: TestPlan,
    /// Plugins to load, keyed by name, with their options
    #[serde(default = "default_plugins")]
    pub plugins: BTreeMap<String, PluginOptions>,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            latency: LatencyConfig::default(),
            stress: StressConfig::default(),
            plan: TestPlan::default(),
            plugins: default_plugins(),
        }
    }
}

fn default_plugins() -> BTreeMap<String, PluginOptions> {
    [DataReporterPlugin::NAME, MetricReporterPlugin::NAME]
        .into_iter()
        .map(|name| (name.to_string(), PluginOptions::new()))
        .collect()
}

/// Runner configuration for plan execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Measured iterations per test unit
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Unmeasured trades before each unit
    #[serde(default = "default_warmup_trades")]
    pub warmup_trades: usize,
    /// Engines run concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup_trades: default_warmup_trades(),
            jobs: default_jobs(),
        }
    }
}

fn default_iterations() -> usize {
    1000
}
fn default_warmup_trades() -> usize {
    DEFAULT_WARMUP_TRADES
}
fn default_jobs() -> usize {
    1
}

impl PerfConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable config");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# perfplan Configuration

[runner]
# Measured iterations per (engine, test type) unit
iterations = 1000
# Unmeasured trades before each unit
warmup_trades = 500
# Engines run concurrently
jobs = 1

[latency]
# Mean latency gate
latency_threshold_ms = 1.0
# Nearest-rank p99 gate
p99_threshold_ms = 1.5

[stress]
cpu_work_units = 10000
memory_block_bytes = 1048576
io_block_bytes = 1048576
cpu_threshold_ms = 50.0
memory_threshold_ms = 20.0
# I/O is only logged unless a gate is set (uncomment to enable)
# io_threshold_ms = 10.0

[plan]
name = "TradingEnginePerformancePlan"

[[plan.entries]]
engine = "AlphaEngine"
tests = ["latency", "stress"]

[[plan.entries]]
engine = "BetaEngine"
tests = ["latency", "stress"]

[plugins.data_reporter]
# report_format = "text"  # text, json or csv
# output_file = "perfplan-summary.txt"

[plugins.metric_reporter]
"#
        .to_string()
    }
}
