//! Test Strategies
//!
//! A strategy knows how to drive an engine for N iterations (`run`) and how to
//! turn the raw measurements into verdicts (`analyze`). The two phases are
//! deliberately separate: `run` produces a [`RawResult`], which observers see
//! before any pass/fail judgement is made.

mod latency;
mod stress;

pub use latency::{LATENCIES_NS, LatencyConfig, LatencyStrategy};
pub use stress::{
    CPU_SERIES, IO_SERIES, MEMORY_SERIES, StressConfig, StressStrategy, summarize_probe,
};

use crate::cancel::Cancellation;
use crate::engine::{Capability, Engine};
use crate::error::{EngineError, HarnessError};
use perfplan_report::{RawValue, ResultSink, ValueMap};
use serde::Serialize;

/// Unreduced measurements produced by a strategy's run phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawResult {
    /// Strategy that produced the result
    pub test_type: String,
    /// Engine that was measured
    pub engine_name: String,
    /// Iterations actually completed
    pub iterations: usize,
    /// Whether the run stopped early on cancellation
    pub aborted: bool,
    /// Strategy-defined fields
    pub fields: ValueMap,
}

impl RawResult {
    /// Empty result for an (engine, strategy) pair
    pub fn new(test_type: impl Into<String>, engine_name: impl Into<String>) -> Self {
        Self {
            test_type: test_type.into(),
            engine_name: engine_name.into(),
            iterations: 0,
            aborted: false,
            fields: ValueMap::new(),
        }
    }

    /// Set a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    /// Look up a series field
    pub fn series(&self, key: &str) -> Option<&[f64]> {
        self.get(key).and_then(RawValue::as_series)
    }
}

/// A pluggable test algorithm
///
/// Strategies are stateless; one instance may be shared across engines and
/// threads.
pub trait Strategy: Send + Sync {
    /// Unique test type, e.g. `"latency"`
    fn test_type(&self) -> &str;

    /// Engine capabilities `run` depends on
    fn required_capabilities(&self) -> &[Capability] {
        &[]
    }

    /// Drive the engine for `iterations` sequential iterations
    fn run(
        &self,
        engine: &mut dyn Engine,
        iterations: usize,
        cancel: &Cancellation,
    ) -> Result<RawResult, HarnessError>;

    /// Reduce a raw result into logs, assertions and attachments
    fn analyze(&self, raw: &RawResult, sink: &mut dyn ResultSink);
}

/// Fail with `MissingCapability` unless the engine has everything the
/// strategy declares
pub fn ensure_capabilities(
    strategy: &dyn Strategy,
    engine: &mut dyn Engine,
) -> Result<(), HarnessError> {
    for &capability in strategy.required_capabilities() {
        if !engine.supports(capability) {
            return Err(HarnessError::MissingCapability {
                engine: engine.name().to_string(),
                test_type: strategy.test_type().to_string(),
                capability,
            });
        }
    }
    Ok(())
}

pub(crate) fn iteration_failure(
    engine: &str,
    test_type: &str,
    iteration: usize,
    err: EngineError,
) -> HarnessError {
    HarnessError::StrategyExecution {
        engine: engine.to_string(),
        test_type: test_type.to_string(),
        iteration,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_result_fields() {
        let mut raw = RawResult::new("latency", "Alpha");
        raw.insert("latencies_ns", vec![1.0, 2.0]);
        raw.insert("note", "warm");

        assert_eq!(raw.series("latencies_ns"), Some(&[1.0, 2.0][..]));
        assert_eq!(raw.get("note").and_then(RawValue::as_str), Some("warm"));
        assert!(raw.series("note").is_none());
        assert!(!raw.aborted);
    }
}
