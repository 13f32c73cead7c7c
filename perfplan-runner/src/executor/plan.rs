//! Plan Execution
//!
//! Runs every unit of a plan and assembles the report tree.
//!
//! ```text
//! TestUnit list
//!      │
//!      ▼
//! ┌──────────┐
//! │  setup   │  driver config, strategy and engine per unit (UnknownKey aborts)
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │ execute  │  one rayon task per engine, units of an engine run in order
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │ assemble │  plan → <engine>_<test_type> → PerformanceSuite → run_performance_test
//! └────┬─────┘
//!      ▼
//!  test_plan_result to every plugin
//! ```
//!
//! A failing unit records a failed case and never stops its siblings.

use super::execution::Executor;
use crate::error::RunnerError;
use crate::planner::TestUnit;
use crate::plugins::PluginSet;
use indicatif::{ProgressBar, ProgressStyle};
use perfplan_core::{Cancellation, DriverConfig, Engine, Registry, Strategy, warm_up};
use perfplan_report::{
    CaseResult, NodeCategory, NodeStatus, ReportMeta, ReportNode, ReportTree, ResultSink,
};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Suite node name under every unit group
pub const SUITE_NAME: &str = "PerformanceSuite";
/// Case node name under every suite
pub const CASE_NAME: &str = "run_performance_test";

/// Knobs for a plan run
#[derive(Debug, Clone)]
pub struct PlanSettings {
    /// Measured iterations per unit
    pub iterations: usize,
    /// Units of distinct engines allowed to run at once
    pub jobs: usize,
    /// Overrides the driver's warm-up length when set
    pub warmup_trades: Option<usize>,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            iterations: 1000,
            jobs: 1,
            warmup_trades: None,
            show_progress: false,
        }
    }
}

/// Result of a completed plan
#[derive(Debug)]
pub struct PlanOutcome {
    /// Full report tree
    pub report: ReportTree,
    /// Ids of units whose case failed, in plan order
    pub failed_units: Vec<String>,
}

impl PlanOutcome {
    /// Whether every case passed
    pub fn is_success(&self) -> bool {
        self.failed_units.is_empty()
    }
}

struct PreparedUnit {
    index: usize,
    unit: TestUnit,
    driver: DriverConfig,
    strategy: Arc<dyn Strategy>,
    engine: Box<dyn Engine>,
}

struct FinishedUnit {
    index: usize,
    id: String,
    node: ReportNode,
}

/// Drives a list of units against a registry
pub struct PlanRunner<'a> {
    registry: &'a Registry,
    plugins: &'a PluginSet,
    settings: PlanSettings,
    cancel: Cancellation,
}

impl<'a> PlanRunner<'a> {
    /// Create a runner
    pub fn new(registry: &'a Registry, plugins: &'a PluginSet, settings: PlanSettings) -> Self {
        Self {
            registry,
            plugins,
            settings,
            cancel: Cancellation::new(),
        }
    }

    /// Use an externally controlled cancellation token
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops every in-flight unit at its next iteration
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Execute `units` and deliver the finished report to every plugin
    pub fn run(&self, plan_name: &str, units: &[TestUnit]) -> Result<PlanOutcome, RunnerError> {
        let started = Instant::now();
        let mut meta = ReportMeta::now();

        let prepared = units
            .iter()
            .enumerate()
            .map(|(index, unit)| self.prepare(index, unit))
            .collect::<Result<Vec<_>, _>>()?;

        let groups = group_by_engine(prepared);
        tracing::info!(
            plan = plan_name,
            units = units.len(),
            engines = groups.len(),
            jobs = self.settings.jobs,
            "starting test plan"
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.jobs.max(1))
            .thread_name(|i| format!("perfplan-unit-{}", i))
            .build()?;
        let progress = self.progress_bar(units.len());

        let mut finished: Vec<FinishedUnit> = pool.install(|| {
            groups
                .into_par_iter()
                .flat_map_iter(|group| {
                    group
                        .into_iter()
                        .map(|unit| self.run_unit(unit, &progress))
                        .collect::<Vec<_>>()
                })
                .collect()
        });
        progress.finish_with_message("Complete");

        finished.sort_by_key(|f| f.index);

        let mut root = ReportNode::new(plan_name, NodeCategory::Plan);
        let mut failed_units = Vec::new();
        for unit in finished {
            if unit.node.status() == NodeStatus::Failed {
                failed_units.push(unit.id);
            }
            root.children.push(unit.node);
        }

        meta.total_duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        let report = ReportTree::new(root, meta);
        let summary = report.summary();
        tracing::info!(
            plan = plan_name,
            passed = summary.passed,
            failed = summary.failed,
            "test plan finished"
        );

        self.plugins.notify_test_plan_result(&report);

        Ok(PlanOutcome {
            report,
            failed_units,
        })
    }

    fn prepare(&self, index: usize, unit: &TestUnit) -> Result<PreparedUnit, RunnerError> {
        let driver = self
            .registry
            .create_driver_config(&format!("driver_{}", unit.engine))?;
        let strategy = self.registry.create_strategy(&unit.test_type)?;
        let engine = self.registry.create_engine(&driver.engine_name)?;

        Ok(PreparedUnit {
            index,
            unit: unit.clone(),
            driver,
            strategy,
            engine,
        })
    }

    fn run_unit(&self, prepared: PreparedUnit, progress: &ProgressBar) -> FinishedUnit {
        let PreparedUnit {
            index,
            unit,
            driver,
            strategy,
            mut engine,
        } = prepared;

        progress.set_message(unit.id.clone());
        tracing::info!(unit = %unit.id, "Running test");

        let mut case = CaseResult::new();
        case.log(format!("Running test: {}", unit.id));
        let warmup = self.settings.warmup_trades.unwrap_or(driver.warmup_trades);

        match warm_up(engine.as_mut(), warmup) {
            Err(e) => {
                tracing::error!(unit = %unit.id, error = %e, "warm-up failed");
                case.fail(&format!("Warm-up failed with error: {}", e));
            }
            Ok(()) => {
                let executor = Executor::new(self.plugins).with_strategy(strategy.clone());
                match executor.execute_with_cancel(
                    engine.as_mut(),
                    self.settings.iterations,
                    &self.cancel,
                ) {
                    Ok(raw) => {
                        if raw.aborted {
                            case.log(format!(
                                "Run cancelled after {} of {} iterations",
                                raw.iterations, self.settings.iterations
                            ));
                        }
                        strategy.analyze(&raw, &mut case);
                        if raw.aborted {
                            case.assert_true(
                                false,
                                &format!(
                                    "Run completed all {} iterations",
                                    self.settings.iterations
                                ),
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(unit = %unit.id, error = %e, "test failed");
                        case.fail(&format!("Test failed with error: {}", e));
                    }
                }
            }
        }

        progress.inc(1);

        let node = ReportNode::new(unit.id.as_str(), NodeCategory::Group).with_child(
            ReportNode::new(SUITE_NAME, NodeCategory::Suite)
                .with_child(ReportNode::case(CASE_NAME, case)),
        );
        FinishedUnit {
            index,
            id: unit.id,
            node,
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Split units by engine, keeping first-appearance order of engines and
/// plan order within each engine
fn group_by_engine(units: Vec<PreparedUnit>) -> Vec<Vec<PreparedUnit>> {
    let mut groups: Vec<Vec<PreparedUnit>> = Vec::new();
    for unit in units {
        match groups
            .iter_mut()
            .find(|g| g.first().is_some_and(|u| u.unit.engine == unit.unit.engine))
        {
            Some(group) => group.push(unit),
            None => groups.push(vec![unit]),
        }
    }
    groups
}
