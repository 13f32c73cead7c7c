//! Test Executor
//!
//! ## Pipeline Overview
//!
//! ```text
//! TestPlan (config or default)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    plan     │  Setup units, schedule per engine, assemble report tree
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  execution  │  notify-start → Strategy::run → notify-complete
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Single (engine, strategy) invocation with plugin hooks
//! - [`plan`] - Concurrent plan execution and report assembly
//! - [`formatting`] - Human-readable output formatting

mod execution;
mod formatting;
mod plan;

pub use execution::Executor;
pub(crate) use execution::panic_message;
pub use formatting::format_human_output;
pub use plan::{CASE_NAME, PlanOutcome, PlanRunner, PlanSettings, SUITE_NAME};
