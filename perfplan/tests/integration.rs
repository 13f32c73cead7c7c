//! Integration tests for perfplan
//!
//! These tests drive whole plans through the public API with scripted
//! engines on a manual clock, so every timing is exact.

use perfplan::{
    CaseEntry, CaseResult, Clock, DriverConfig, Engine, Executor, HarnessError, LatencyConfig,
    LatencyStrategy, ManualClock, NodeStatus, PlanRunner, PlanSettings, Plugin, PluginError,
    PluginSet, RawResult, Registry, ReportTree, ScriptedEngine, Strategy, StressConfig, TestPlan,
    TestUnit, build_units, engine_factory, generate_json_report, summarize_report,
};
use std::sync::{Arc, Mutex};

const ENGINES: [&str; 2] = ["AlphaEngine", "BetaEngine"];

fn scripted_registry(clock: &Arc<ManualClock>, without_operations: &[&'static str]) -> Registry {
    let stress = StressConfig {
        cpu_work_units: 16,
        memory_block_bytes: 256,
        io_block_bytes: 256,
        ..StressConfig::default()
    };
    let shared: Arc<dyn Clock> = clock.clone();
    let mut registry = Registry::with_default_strategies(LatencyConfig::default(), stress, shared);

    for name in ENGINES {
        let clock = clock.clone();
        let strip = without_operations.contains(&name);
        registry
            .register_engine(engine_factory(name, move || {
                let engine = ScriptedEngine::new(name, clock.clone()).with_trade_latency_ns(200_000);
                let engine = if strip {
                    engine.without_operations()
                } else {
                    engine
                };
                Box::new(engine) as Box<dyn Engine>
            }))
            .unwrap();
        registry.register_driver(format!("driver_{}", name), move || {
            DriverConfig::for_engine(name).with_warmup(10)
        });
    }
    registry
}

/// Shares every observed hook call with the test
struct Observer {
    events: Arc<Mutex<Vec<String>>>,
    final_report: Arc<Mutex<Option<ReportTree>>>,
}

impl Plugin for Observer {
    fn name(&self) -> &str {
        "observer"
    }

    fn on_test_start(&mut self, engine: &str, test_type: &str) -> Result<(), PluginError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {}_{}", engine, test_type));
        Ok(())
    }

    fn on_test_complete(&mut self, result: &RawResult) -> Result<(), PluginError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {}_{}", result.engine_name, result.test_type));
        Ok(())
    }

    fn test_plan_result(&mut self, report: &ReportTree) -> Result<(), PluginError> {
        *self.final_report.lock().unwrap() = Some(report.clone());
        Ok(())
    }
}

/// Fails or panics in every hook
struct Saboteur;

impl Plugin for Saboteur {
    fn name(&self) -> &str {
        "saboteur"
    }

    fn on_test_start(&mut self, _engine: &str, _test_type: &str) -> Result<(), PluginError> {
        Err(PluginError::Hook("no".into()))
    }

    fn on_test_complete(&mut self, _result: &RawResult) -> Result<(), PluginError> {
        panic!("saboteur");
    }

    fn test_plan_result(&mut self, _report: &ReportTree) -> Result<(), PluginError> {
        Err(PluginError::Hook("still no".into()))
    }
}

fn observed_plugins(
    with_saboteur: bool,
) -> (
    PluginSet,
    Arc<Mutex<Vec<String>>>,
    Arc<Mutex<Option<ReportTree>>>,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let final_report = Arc::new(Mutex::new(None));
    let mut plugins = PluginSet::new();
    if with_saboteur {
        plugins.register(Box::new(Saboteur));
    }
    plugins.register(Box::new(Observer {
        events: events.clone(),
        final_report: final_report.clone(),
    }));
    (plugins, events, final_report)
}

fn settings(iterations: usize) -> PlanSettings {
    PlanSettings {
        iterations,
        jobs: 1,
        ..PlanSettings::default()
    }
}

#[test]
fn test_full_plan_aggregates_four_units() {
    let clock = Arc::new(ManualClock::new());
    let registry = scripted_registry(&clock, &[]);
    let (plugins, events, final_report) = observed_plugins(false);
    let plan = TestPlan::default();
    let units = build_units(&plan, None);

    let outcome = PlanRunner::new(&registry, &plugins, settings(100))
        .run(&plan.name, &units)
        .unwrap();

    assert!(outcome.is_success());
    let summary = summarize_report(&outcome.report);
    assert_eq!(summary.entries.len(), 4);
    assert_eq!(summary.total_points, 400);
    for entry in &summary.entries {
        assert_eq!(entry.stats.count, 100);
        assert!((entry.stats.mean - 0.2).abs() < 1e-9, "{}", entry.test_id);
        assert!((entry.stats.min - 0.2).abs() < 1e-9);
        assert!((entry.stats.max - 0.2).abs() < 1e-9);
    }
    assert!(
        summary
            .get("BetaEngine_stress/run_performance_test")
            .is_some()
    );

    let cases = outcome.report.root.children[0].cases();
    let logs: Vec<_> = cases[0]
        .entries
        .iter()
        .filter_map(|e| match e {
            CaseEntry::Log { message } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        logs,
        vec![
            "Running test: AlphaEngine_latency",
            "Avg Latency: 0.200 ms",
            "P99 Latency: 0.200 ms",
        ]
    );

    // Start/complete pairs arrive per unit, in plan order
    let events = events.lock().unwrap();
    let expected: Vec<String> = units
        .iter()
        .flat_map(|u| [format!("start {}", u.id), format!("complete {}", u.id)])
        .collect();
    assert_eq!(*events, expected);

    let delivered = final_report.lock().unwrap();
    assert_eq!(
        delivered.as_ref().unwrap().root.name,
        "TradingEnginePerformancePlan"
    );
}

#[test]
fn test_misbehaving_plugin_never_aborts_run() {
    let clock = Arc::new(ManualClock::new());
    let registry = scripted_registry(&clock, &[]);
    let (plugins, events, final_report) = observed_plugins(true);
    let units = build_units(&TestPlan::default(), None);

    let outcome = PlanRunner::new(&registry, &plugins, settings(10))
        .run("Plan", &units)
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(events.lock().unwrap().len(), 8);
    assert!(final_report.lock().unwrap().is_some());
}

#[test]
fn test_missing_probe_fails_only_stress_unit() {
    let clock = Arc::new(ManualClock::new());
    let registry = scripted_registry(&clock, &["BetaEngine"]);
    let (plugins, events, _) = observed_plugins(false);
    let units = build_units(&TestPlan::default(), None);

    let outcome = PlanRunner::new(&registry, &plugins, settings(20))
        .run("Plan", &units)
        .unwrap();

    assert_eq!(outcome.failed_units, vec!["BetaEngine_stress"]);
    let statuses: Vec<_> = outcome
        .report
        .root
        .children
        .iter()
        .map(|g| g.status())
        .collect();
    assert_eq!(
        statuses,
        vec![
            NodeStatus::Passed,
            NodeStatus::Passed,
            NodeStatus::Passed,
            NodeStatus::Failed,
        ]
    );

    // The failed unit reports start but never complete
    let events = events.lock().unwrap();
    assert!(events.contains(&"start BetaEngine_stress".to_string()));
    assert!(!events.contains(&"complete BetaEngine_stress".to_string()));

    // Three units still contribute data
    assert_eq!(summarize_report(&outcome.report).total_points, 60);
}

#[test]
fn test_json_report_carries_attachments() {
    let clock = Arc::new(ManualClock::new());
    let registry = scripted_registry(&clock, &[]);
    let plugins = PluginSet::new();
    let units = vec![TestUnit::new("AlphaEngine", "stress")];

    let outcome = PlanRunner::new(&registry, &plugins, settings(5))
        .run("Plan", &units)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&generate_json_report(&outcome.report).unwrap()).unwrap();
    let case = &json["root"]["children"][0]["children"][0]["children"][0];
    assert_eq!(case["name"], "run_performance_test");
    let stress = &case["attachments"]["StressRawData"];
    assert_eq!(stress["stress_data_ms"].as_array().unwrap().len(), 5);
    assert_eq!(stress["io_stress_ms"].as_array().unwrap().len(), 5);
}

#[test]
fn test_direct_executor_and_analyze() {
    let clock = Arc::new(ManualClock::new());
    let registry = scripted_registry(&clock, &[]);
    let (plugins, events, _) = observed_plugins(false);

    let strategy = registry.create_strategy("latency").unwrap();
    let mut engine = registry.create_engine("AlphaEngine").unwrap();
    let executor = Executor::new(&plugins).with_strategy(strategy.clone());

    let raw = executor.execute(engine.as_mut(), 100).unwrap();
    let mut case = CaseResult::new();
    strategy.analyze(&raw, &mut case);

    assert!(case.passed());
    assert_eq!(
        *events.lock().unwrap(),
        vec!["start AlphaEngine_latency", "complete AlphaEngine_latency"]
    );

    let err = registry.create_strategy("soak").err().unwrap();
    assert!(matches!(err, HarnessError::UnknownKey { .. }));
}

#[test]
fn test_slow_engine_fails_thresholds_independently() {
    let clock = Arc::new(ManualClock::new());
    let mut engine = ScriptedEngine::new("Slow", clock.clone()).with_trade_latency_ns(1_200_000);
    let strategy = LatencyStrategy::new(LatencyConfig::default(), clock);
    let plugins = PluginSet::new();

    let raw = Executor::new(&plugins)
        .with_strategy(Arc::new(strategy.clone()))
        .execute(&mut engine, 50)
        .unwrap();
    let mut case = CaseResult::new();
    strategy.analyze(&raw, &mut case);

    // 1.2ms misses the 1.0ms mean gate but clears the 1.5ms p99 gate
    let verdicts: Vec<_> = case.assertions().map(|a| a.passed).collect();
    assert_eq!(verdicts, vec![false, true]);
    assert!(!case.passed());
}
