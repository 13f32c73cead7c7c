//! perfplan Custom Engine Example
//!
//! Registers a hand-written engine next to the simulated ones, adds a
//! plugin that prints every lifecycle event, and runs the plan.
//!
//! Run with:
//!   cargo run --example custom_engine
//!   cargo run --example custom_engine -- 200    # iterations per unit

use perfplan::prelude::*;
use perfplan::{
    DriverConfig, EngineError, OperationKind, OperationProbe, Order, PlanEntry, PluginError,
    RawResult, ReportTree, TestPlan, TradeOutcome, engine_factory, summarize_report,
};
use std::hint::black_box;

/// Engine that hashes the order symbol a few hundred times per trade
struct HashingEngine {
    trades: u64,
    scratch: Vec<u8>,
}

impl HashingEngine {
    fn new() -> Self {
        Self {
            trades: 0,
            scratch: Vec::new(),
        }
    }
}

impl Engine for HashingEngine {
    fn name(&self) -> &str {
        "HashingEngine"
    }

    fn execute_trade(&mut self, order: &Order) -> Result<TradeOutcome, EngineError> {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for _ in 0..256 {
            for b in order.symbol.bytes() {
                h = (h ^ b as u64).wrapping_mul(0x0100_0000_01b3);
            }
        }
        black_box(h);
        self.trades += 1;
        Ok(TradeOutcome {
            engine: self.name().to_string(),
            sequence: self.trades,
        })
    }

    fn operations(&mut self) -> Option<&mut dyn OperationProbe> {
        Some(self)
    }
}

impl OperationProbe for HashingEngine {
    fn execute_operation(
        &mut self,
        _kind: OperationKind,
        size_bytes: usize,
    ) -> Result<u64, EngineError> {
        let start = std::time::Instant::now();
        self.scratch.clear();
        self.scratch.resize(size_bytes, 0xab);
        black_box(&self.scratch);
        Ok(start.elapsed().as_nanos() as u64)
    }
}

/// Prints every hook call
struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn name(&self) -> &str {
        "console"
    }

    fn on_test_start(&mut self, engine: &str, test_type: &str) -> Result<(), PluginError> {
        println!("-> {} on {}", test_type, engine);
        Ok(())
    }

    fn on_test_complete(&mut self, result: &RawResult) -> Result<(), PluginError> {
        println!(
            "<- {} on {}: {} iterations",
            result.test_type, result.engine_name, result.iterations
        );
        Ok(())
    }

    fn test_plan_result(&mut self, report: &ReportTree) -> Result<(), PluginError> {
        let summary = summarize_report(report);
        println!(
            "plan '{}' produced {} data points",
            report.root.name, summary.total_points
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let iterations = std::env::args()
        .nth(1)
        .map(|s| s.parse::<usize>())
        .transpose()?
        .unwrap_or(100);

    let mut config = PerfConfig::default();
    config
        .plan
        .entries
        .push(PlanEntry::new("HashingEngine", &["latency", "stress"]));

    let mut registry = builtin_registry(&config)?;
    registry.register_engine(engine_factory("HashingEngine", || {
        Box::new(HashingEngine::new()) as Box<dyn Engine>
    }))?;
    registry.register_driver("driver_HashingEngine", || {
        DriverConfig::for_engine("HashingEngine").with_warmup(50)
    });

    let mut plugins = plugins_from_config(&config)?;
    plugins.register(Box::new(ConsolePlugin));

    let plan: &TestPlan = &config.plan;
    let units = build_units(plan, None);
    let settings = PlanSettings {
        iterations,
        jobs: 3,
        ..PlanSettings::default()
    };

    let outcome = PlanRunner::new(&registry, &plugins, settings).run(&plan.name, &units)?;
    print!("{}", format_human_output(&outcome.report));

    Ok(())
}
