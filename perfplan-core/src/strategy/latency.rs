//! Latency Strategy
//!
//! Times `iterations` sequential trades and judges the mean and the
//! nearest-rank p99 against configured thresholds.

use super::{RawResult, Strategy, iteration_failure};
use crate::cancel::Cancellation;
use crate::engine::{Engine, Order};
use crate::error::HarnessError;
use crate::measure::{Clock, Timer};
use perfplan_report::{LATENCY_ATTACHMENT, LATENCY_SERIES, ResultSink, ValueMap};
use perfplan_stats::{compute_percentile, mean, nanos_to_millis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw result field holding per-trade durations in nanoseconds
pub const LATENCIES_NS: &str = "latencies_ns";

/// Pass/fail thresholds for latency runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// Mean latency must stay below this (ms)
    #[serde(default = "default_latency_threshold")]
    pub latency_threshold_ms: f64,
    /// p99 latency must stay below this (ms)
    #[serde(default = "default_p99_threshold")]
    pub p99_threshold_ms: f64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: default_latency_threshold(),
            p99_threshold_ms: default_p99_threshold(),
        }
    }
}

fn default_latency_threshold() -> f64 {
    1.0
}
fn default_p99_threshold() -> f64 {
    1.5
}

/// Measures per-trade latency
#[derive(Debug, Clone)]
pub struct LatencyStrategy {
    config: LatencyConfig,
    clock: Arc<dyn Clock>,
}

impl LatencyStrategy {
    /// Test type name
    pub const TEST_TYPE: &'static str = "latency";

    /// Create a strategy timing against `clock`
    pub fn new(config: LatencyConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Configured thresholds
    pub fn config(&self) -> &LatencyConfig {
        &self.config
    }
}

impl Strategy for LatencyStrategy {
    fn test_type(&self) -> &str {
        Self::TEST_TYPE
    }

    fn run(
        &self,
        engine: &mut dyn Engine,
        iterations: usize,
        cancel: &Cancellation,
    ) -> Result<RawResult, HarnessError> {
        let engine_name = engine.name().to_string();
        let mut result = RawResult::new(Self::TEST_TYPE, engine_name.as_str());
        let order = Order::probe();
        let mut latencies_ns = Vec::with_capacity(iterations);

        for i in 0..iterations {
            if cancel.is_cancelled() {
                result.aborted = true;
                break;
            }

            let timer = Timer::start(self.clock.as_ref());
            engine
                .execute_trade(&order)
                .map_err(|e| iteration_failure(&engine_name, Self::TEST_TYPE, i, e))?;
            latencies_ns.push(timer.stop() as f64);
        }

        result.iterations = latencies_ns.len();
        result.insert(LATENCIES_NS, latencies_ns);
        Ok(result)
    }

    fn analyze(&self, raw: &RawResult, sink: &mut dyn ResultSink) {
        let engine = &raw.engine_name;
        let latencies_ms = nanos_to_millis(raw.series(LATENCIES_NS).unwrap_or(&[]));

        if latencies_ms.is_empty() {
            sink.log(format!("No latency samples collected for {}", engine));
            sink.assert_true(false, &format!("Latency samples collected for {}", engine));
            return;
        }

        let avg_latency = mean(&latencies_ms);
        let p99_latency = compute_percentile(&latencies_ms, 99.0);

        sink.log(format!("Avg Latency: {:.3} ms", avg_latency));
        sink.log(format!("P99 Latency: {:.3} ms", p99_latency));

        sink.assert_less(
            avg_latency,
            self.config.latency_threshold_ms,
            &format!(
                "Avg Latency under {}ms for {}",
                self.config.latency_threshold_ms, engine
            ),
        );
        sink.assert_less(
            p99_latency,
            self.config.p99_threshold_ms,
            &format!(
                "P99 Latency under {}ms for {}",
                self.config.p99_threshold_ms, engine
            ),
        );

        let mut body = ValueMap::new();
        body.insert(LATENCY_SERIES.to_string(), latencies_ms.into());
        sink.attach(LATENCY_ATTACHMENT, body);
    }
}
