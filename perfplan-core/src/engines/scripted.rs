//! Deterministic engine driven by a [`ManualClock`].
//!
//! Each trade advances the shared clock by a fixed amount and each probe
//! operation by the next scripted latency, so strategies timing against the
//! same clock observe exact, repeatable durations.

use crate::engine::{Engine, OperationKind, OperationProbe, Order, TradeOutcome};
use crate::error::EngineError;
use crate::measure::ManualClock;
use std::sync::Arc;

/// Engine with scripted timings and failure points
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    name: String,
    clock: Arc<ManualClock>,
    trade_latency_ns: u64,
    operation_latencies_ns: Vec<u64>,
    fail_after: Option<u64>,
    has_operations: bool,
    trades: u64,
    operations: u64,
}

impl ScriptedEngine {
    /// Engine whose trades and operations take 200µs each
    pub fn new(name: impl Into<String>, clock: Arc<ManualClock>) -> Self {
        Self {
            name: name.into(),
            clock,
            trade_latency_ns: 200_000,
            operation_latencies_ns: Vec::new(),
            fail_after: None,
            has_operations: true,
            trades: 0,
            operations: 0,
        }
    }

    /// Fixed latency of every trade
    pub fn with_trade_latency_ns(mut self, nanos: u64) -> Self {
        self.trade_latency_ns = nanos;
        self
    }

    /// Latencies of successive probe operations, repeated cyclically.
    /// Empty means "same as a trade".
    pub fn with_operation_latencies_ns(mut self, nanos: Vec<u64>) -> Self {
        self.operation_latencies_ns = nanos;
        self
    }

    /// Fail every trade once `trades` trades have succeeded
    pub fn failing_after(mut self, trades: u64) -> Self {
        self.fail_after = Some(trades);
        self
    }

    /// Drop the probe-operation capability
    pub fn without_operations(mut self) -> Self {
        self.has_operations = false;
        self
    }

    /// Trades executed so far
    pub fn trades(&self) -> u64 {
        self.trades
    }

    fn next_operation_latency(&mut self) -> u64 {
        let latency = if self.operation_latencies_ns.is_empty() {
            self.trade_latency_ns
        } else {
            let idx = (self.operations % self.operation_latencies_ns.len() as u64) as usize;
            self.operation_latencies_ns[idx]
        };
        self.operations += 1;
        latency
    }
}

impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute_trade(&mut self, _order: &Order) -> Result<TradeOutcome, EngineError> {
        if self.fail_after.is_some_and(|limit| self.trades >= limit) {
            return Err(EngineError::Fault(format!(
                "scripted failure after {} trades",
                self.trades
            )));
        }

        self.clock.advance(self.trade_latency_ns);
        self.trades += 1;
        Ok(TradeOutcome {
            engine: self.name.clone(),
            sequence: self.trades,
        })
    }

    fn operations(&mut self) -> Option<&mut dyn OperationProbe> {
        if self.has_operations { Some(self) } else { None }
    }
}

impl OperationProbe for ScriptedEngine {
    fn execute_operation(
        &mut self,
        _kind: OperationKind,
        _size_bytes: usize,
    ) -> Result<u64, EngineError> {
        let latency = self.next_operation_latency();
        self.clock.advance(latency);
        Ok(latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Clock;

    #[test]
    fn test_trade_advances_clock() {
        let clock = Arc::new(ManualClock::new());
        let mut engine = ScriptedEngine::new("Alpha", clock.clone()).with_trade_latency_ns(1_000);

        engine.execute_trade(&Order::probe()).unwrap();
        engine.execute_trade(&Order::probe()).unwrap();

        assert_eq!(clock.now_ns(), 2_000);
        assert_eq!(engine.trades(), 2);
    }

    #[test]
    fn test_operation_latencies_cycle() {
        let clock = Arc::new(ManualClock::new());
        let mut engine =
            ScriptedEngine::new("Alpha", clock.clone()).with_operation_latencies_ns(vec![1, 2]);
        let probe = engine.operations().unwrap();

        let got: Vec<u64> = (0..3)
            .map(|_| probe.execute_operation(OperationKind::Write, 0).unwrap())
            .collect();
        assert_eq!(got, vec![1, 2, 1]);
        assert_eq!(clock.now_ns(), 4);
    }

    #[test]
    fn test_failing_after() {
        let clock = Arc::new(ManualClock::new());
        let mut engine = ScriptedEngine::new("Alpha", clock).failing_after(1);

        assert!(engine.execute_trade(&Order::probe()).is_ok());
        assert!(matches!(
            engine.execute_trade(&Order::probe()),
            Err(EngineError::Fault(_))
        ));
    }

    #[test]
    fn test_without_operations() {
        let clock = Arc::new(ManualClock::new());
        let mut engine = ScriptedEngine::new("Alpha", clock).without_operations();
        assert!(engine.operations().is_none());
    }
}
