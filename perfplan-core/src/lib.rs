#![warn(missing_docs)]
//! perfplan Core - Engines, Strategies and Registry
//!
//! This crate provides the abstractions a performance run is built from:
//! - [`Engine`]: the unit under test, with an optional probe-operation capability
//! - [`Strategy`]: a two-phase test algorithm (`run` then `analyze`)
//! - [`Registry`]: name-keyed constructors for engines, drivers and strategies
//! - [`Clock`] / [`Timer`]: monotonic or manually driven timing
//! - [`Cancellation`]: cooperative early stop for in-flight runs

mod cancel;
mod engine;
pub mod engines;
mod error;
mod measure;
mod registry;
mod strategy;

pub use cancel::Cancellation;
pub use engine::{
    Capability, DEFAULT_WARMUP_TRADES, Engine, OperationKind, OperationProbe, Order, TradeOutcome,
    warm_up,
};
pub use engines::{ScriptedEngine, SimulatedEngine};
pub use error::{EngineError, HarnessError, RegistryKind};
pub use measure::{Clock, ManualClock, MonotonicClock, Timer, ns_to_ms};
pub use registry::{DriverConfig, EngineFactory, Registry, engine_factory};
pub use strategy::{
    CPU_SERIES, IO_SERIES, LATENCIES_NS, LatencyConfig, LatencyStrategy, MEMORY_SERIES, RawResult,
    Strategy, StressConfig, StressStrategy, ensure_capabilities, summarize_probe,
};
