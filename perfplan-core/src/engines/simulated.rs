//! Sleep-based engine simulation with a fixed latency profile.

use crate::engine::{Engine, OperationKind, OperationProbe, Order, TradeOutcome};
use crate::error::EngineError;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

/// Simulated engine whose trades take `base_latency_ns * (1 + volume * 0.01)`
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    name: String,
    base_latency_ns: u64,
    trades: u64,
}

impl SimulatedEngine {
    /// Create an engine with a fixed base latency
    pub fn new(name: impl Into<String>, base_latency_ns: u64) -> Self {
        Self {
            name: name.into(),
            base_latency_ns,
            trades: 0,
        }
    }

    /// Low-latency profile
    pub fn alpha() -> Self {
        Self::new("AlphaEngine", 50)
    }

    /// Slower profile
    pub fn beta() -> Self {
        Self::new("BetaEngine", 150)
    }

    /// Trades executed so far, warm-up included
    pub fn trades(&self) -> u64 {
        self.trades
    }

    fn trade_delay(&self, volume: u32) -> Duration {
        let nanos = self.base_latency_ns as f64 * (1.0 + volume as f64 * 0.01);
        Duration::from_nanos(nanos as u64)
    }
}

impl Engine for SimulatedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute_trade(&mut self, order: &Order) -> Result<TradeOutcome, EngineError> {
        std::thread::sleep(self.trade_delay(order.volume));
        self.trades += 1;
        Ok(TradeOutcome {
            engine: self.name.clone(),
            sequence: self.trades,
        })
    }

    fn operations(&mut self) -> Option<&mut dyn OperationProbe> {
        Some(self)
    }
}

impl OperationProbe for SimulatedEngine {
    fn execute_operation(
        &mut self,
        kind: OperationKind,
        size_bytes: usize,
    ) -> Result<u64, EngineError> {
        let start = Instant::now();
        let io_err = |source| EngineError::Io { kind, source };

        match kind {
            OperationKind::Write => {
                let data = vec![b'x'; size_bytes];
                std::io::sink().write_all(&data).map_err(io_err)?;
            }
            OperationKind::Read => {
                let mut buf = Vec::with_capacity(size_bytes);
                std::io::repeat(0)
                    .take(size_bytes as u64)
                    .read_to_end(&mut buf)
                    .map_err(io_err)?;
            }
        }

        Ok(u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }
}
