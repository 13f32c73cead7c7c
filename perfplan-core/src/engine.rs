//! Engine Abstraction
//!
//! An engine is the unit under test. Every engine executes trades; the generic
//! probe operation used by stress testing is an optional capability exposed
//! through [`Engine::operations`].

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Default number of warm-up trades performed before a measured run
pub const DEFAULT_WARMUP_TRADES: usize = 500;

/// A synthetic order submitted to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Instrument symbol
    pub symbol: String,
    /// Order volume
    pub volume: u32,
}

impl Order {
    /// Create an order
    pub fn new(symbol: impl Into<String>, volume: u32) -> Self {
        Self {
            symbol: symbol.into(),
            volume,
        }
    }

    /// Order used for measured iterations
    pub fn probe() -> Self {
        Self::new("TEST/USD", 1)
    }

    /// Order used while warming an engine up
    pub fn warmup() -> Self {
        Self::new("WARMUP/USD", 1)
    }
}

/// What an engine reports back for an executed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOutcome {
    /// Engine that executed the order
    pub engine: String,
    /// Sequence number of the trade within this engine instance
    pub sequence: u64,
}

/// Kind of generic probe operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Read `size_bytes` from a source
    Read,
    /// Write `size_bytes` to a sink
    Write,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Read => write!(f, "read"),
            OperationKind::Write => write!(f, "write"),
        }
    }
}

/// Optional engine capabilities a strategy may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// [`OperationProbe::execute_operation`]
    Operations,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Operations => write!(f, "execute_operation"),
        }
    }
}

/// Generic probe operation used by stress testing
pub trait OperationProbe {
    /// Perform an operation of `size_bytes`; returns its own duration in nanoseconds
    fn execute_operation(&mut self, kind: OperationKind, size_bytes: usize)
    -> Result<u64, EngineError>;
}

/// The unit under test
///
/// `execute_trade` may be called any number of times in any order. Engines
/// know nothing about the strategy driving them.
pub trait Engine: Send {
    /// Stable, unique engine name
    fn name(&self) -> &str;

    /// Execute one order
    fn execute_trade(&mut self, order: &Order) -> Result<TradeOutcome, EngineError>;

    /// Probe capability, if this engine has one
    fn operations(&mut self) -> Option<&mut dyn OperationProbe> {
        None
    }

    /// Whether the engine offers a capability
    fn supports(&mut self, capability: Capability) -> bool {
        match capability {
            Capability::Operations => self.operations().is_some(),
        }
    }
}

/// Warm an engine up with `trades` unmeasured orders
pub fn warm_up(engine: &mut dyn Engine, trades: usize) -> Result<(), EngineError> {
    let order = Order::warmup();
    for _ in 0..trades {
        engine.execute_trade(&order)?;
    }
    tracing::debug!(engine = engine.name(), trades, "engine warmed up");
    Ok(())
}
