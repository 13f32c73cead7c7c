//! Stress Strategy
//!
//! Each round runs three independently timed probes:
//! - CPU: a fixed number of squarings of random floats
//! - Memory: one block allocation, released after timing
//! - I/O: a write of `io_block_bytes` delegated to the engine
//!
//! CPU and memory means are gated by thresholds. The I/O mean is only
//! logged unless `io_threshold_ms` is configured.

use super::{RawResult, Strategy, ensure_capabilities, iteration_failure};
use crate::cancel::Cancellation;
use crate::engine::{Capability, Engine, OperationKind};
use crate::error::HarnessError;
use crate::measure::{Clock, Timer, ns_to_ms};
use perfplan_report::{RawValue, ResultSink, STRESS_ATTACHMENT, STRESS_SERIES, ValueMap};
use perfplan_stats::compute_summary;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::sync::Arc;

/// CPU probe series key
pub const CPU_SERIES: &str = "cpu_stress_ms";
/// Memory probe series key
pub const MEMORY_SERIES: &str = "memory_stress_ms";
/// I/O probe series key
pub const IO_SERIES: &str = "io_stress_ms";

const PROBES: [&str; 3] = [CPU_SERIES, MEMORY_SERIES, IO_SERIES];

/// Work sizes and thresholds for stress runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Squarings per CPU probe
    pub cpu_work_units: usize,
    /// Bytes allocated per memory probe
    pub memory_block_bytes: usize,
    /// Bytes written per I/O probe
    pub io_block_bytes: usize,
    /// CPU probe mean must stay below this (ms)
    pub cpu_threshold_ms: f64,
    /// Memory probe mean must stay below this (ms)
    pub memory_threshold_ms: f64,
    /// I/O probe mean gate (ms); `None` logs without asserting
    pub io_threshold_ms: Option<f64>,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            cpu_work_units: 10_000,
            memory_block_bytes: 1024 * 1024,
            io_block_bytes: 1024 * 1024,
            cpu_threshold_ms: 50.0,
            memory_threshold_ms: 20.0,
            io_threshold_ms: None,
        }
    }
}

/// Reduce one probe series to `{min_ms, max_ms, avg_ms, raw_data_ms}`
pub fn summarize_probe(series: &[f64]) -> ValueMap {
    let stats = compute_summary(series);
    let mut out = ValueMap::new();
    out.insert("min_ms".into(), stats.min.into());
    out.insert("max_ms".into(), stats.max.into());
    out.insert("avg_ms".into(), stats.mean.into());
    out.insert("raw_data_ms".into(), series.to_vec().into());
    out
}

/// CPU / memory / I/O stress probes
#[derive(Debug, Clone)]
pub struct StressStrategy {
    config: StressConfig,
    clock: Arc<dyn Clock>,
}

impl StressStrategy {
    /// Test type name
    pub const TEST_TYPE: &'static str = "stress";

    /// Create a strategy timing against `clock`
    pub fn new(config: StressConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Configured work sizes and thresholds
    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    fn cpu_probe(&self, rng: &mut impl Rng) -> f64 {
        let timer = Timer::start(self.clock.as_ref());
        let mut acc = 0.0f64;
        for _ in 0..self.config.cpu_work_units {
            acc += black_box(rng.gen_range(0.0..1.0f64)).powi(2);
        }
        black_box(acc);
        ns_to_ms(timer.stop())
    }

    fn memory_probe(&self) -> f64 {
        let timer = Timer::start(self.clock.as_ref());
        let block = black_box(vec![b'x'; self.config.memory_block_bytes]);
        let elapsed = timer.stop();
        drop(block);
        ns_to_ms(elapsed)
    }

    fn probe_mean(raw: &RawResult, probe: &str) -> Option<f64> {
        raw.get(probe)
            .and_then(|v| v.get("avg_ms"))
            .and_then(RawValue::as_f64)
    }

    fn probe_series<'a>(raw: &'a RawResult, probe: &str) -> &'a [f64] {
        raw.get(probe)
            .and_then(|v| v.get("raw_data_ms"))
            .and_then(RawValue::as_series)
            .unwrap_or(&[])
    }
}

impl Strategy for StressStrategy {
    fn test_type(&self) -> &str {
        Self::TEST_TYPE
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Operations]
    }

    fn run(
        &self,
        engine: &mut dyn Engine,
        iterations: usize,
        cancel: &Cancellation,
    ) -> Result<RawResult, HarnessError> {
        ensure_capabilities(self, engine)?;

        let engine_name = engine.name().to_string();
        let mut result = RawResult::new(Self::TEST_TYPE, engine_name.as_str());
        let mut cpu = Vec::with_capacity(iterations);
        let mut memory = Vec::with_capacity(iterations);
        let mut io = Vec::with_capacity(iterations);
        let mut rng = rand::thread_rng();

        for i in 0..iterations {
            if cancel.is_cancelled() {
                result.aborted = true;
                break;
            }

            let cpu_ms = self.cpu_probe(&mut rng);
            let memory_ms = self.memory_probe();

            let probe = engine.operations().ok_or_else(|| HarnessError::MissingCapability {
                engine: engine_name.clone(),
                test_type: Self::TEST_TYPE.to_string(),
                capability: Capability::Operations,
            })?;
            let timer = Timer::start(self.clock.as_ref());
            probe
                .execute_operation(OperationKind::Write, self.config.io_block_bytes)
                .map_err(|e| iteration_failure(&engine_name, Self::TEST_TYPE, i, e))?;
            let io_ms = ns_to_ms(timer.stop());

            cpu.push(cpu_ms);
            memory.push(memory_ms);
            io.push(io_ms);
        }

        result.iterations = io.len();
        for (key, series) in PROBES.into_iter().zip([cpu, memory, io]) {
            result.insert(key, summarize_probe(&series));
        }
        Ok(result)
    }

    fn analyze(&self, raw: &RawResult, sink: &mut dyn ResultSink) {
        let engine = &raw.engine_name;
        if raw.iterations == 0 {
            sink.log(format!("No stress rounds completed for {}", engine));
            sink.assert_true(false, &format!("Stress samples collected for {}", engine));
            return;
        }

        let cpu_avg = Self::probe_mean(raw, CPU_SERIES).unwrap_or(0.0);
        let memory_avg = Self::probe_mean(raw, MEMORY_SERIES).unwrap_or(0.0);
        let io_avg = Self::probe_mean(raw, IO_SERIES).unwrap_or(0.0);

        sink.log(format!("Avg CPU Stress Time: {:.3} ms", cpu_avg));
        sink.log(format!("Avg Memory Stress Time: {:.3} ms", memory_avg));
        sink.log(format!("Avg IO Stress Time: {:.3} ms", io_avg));

        sink.assert_less(
            cpu_avg,
            self.config.cpu_threshold_ms,
            &format!("Avg CPU Stress under {}ms", self.config.cpu_threshold_ms),
        );
        sink.assert_less(
            memory_avg,
            self.config.memory_threshold_ms,
            &format!(
                "Avg Memory Stress under {}ms",
                self.config.memory_threshold_ms
            ),
        );
        if let Some(io_threshold) = self.config.io_threshold_ms {
            sink.assert_less(
                io_avg,
                io_threshold,
                &format!("Avg IO Stress under {}ms", io_threshold),
            );
        }

        let cpu = Self::probe_series(raw, CPU_SERIES);
        let memory = Self::probe_series(raw, MEMORY_SERIES);
        let io = Self::probe_series(raw, IO_SERIES);
        let rounds: Vec<f64> = cpu
            .iter()
            .zip(memory)
            .zip(io)
            .map(|((c, m), i)| c + m + i)
            .collect();

        let mut body = ValueMap::new();
        body.insert(STRESS_SERIES.to_string(), rounds.into());
        body.insert(CPU_SERIES.to_string(), cpu.to_vec().into());
        body.insert(MEMORY_SERIES.to_string(), memory.to_vec().into());
        body.insert(IO_SERIES.to_string(), io.to_vec().into());
        body.insert("iterations".to_string(), raw.iterations.into());
        sink.attach(STRESS_ATTACHMENT, body);
    }
}
