//! Built-in engines
//!
//! - [`SimulatedEngine`]: sleep-based latency profile, real I/O probes
//! - [`ScriptedEngine`]: deterministic timings against a [`crate::ManualClock`]

mod scripted;
mod simulated;

pub use scripted::ScriptedEngine;
pub use simulated::SimulatedEngine;
