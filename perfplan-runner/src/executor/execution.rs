//! Single-run Execution
//!
//! An [`Executor`] binds one strategy to one engine per invocation and
//! brackets the run with plugin notifications:
//!
//! ```text
//! notify-start (registration order)
//!        │
//!        ▼
//!   Strategy::run  ── Err / panic ──▶ error returned, notify-complete skipped
//!        │
//!        ▼
//! notify-complete (registration order, aborted runs included)
//! ```
//!
//! `analyze` is left to the caller so verdicts stay decoupled from
//! lifecycle notification.

use crate::plugins::PluginSet;
use perfplan_core::{Cancellation, Engine, HarnessError, RawResult, Strategy};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Runs a bound strategy against engines and notifies plugins
pub struct Executor<'a> {
    strategy: Option<Arc<dyn Strategy>>,
    plugins: &'a PluginSet,
}

impl<'a> Executor<'a> {
    /// Executor with no strategy bound yet
    pub fn new(plugins: &'a PluginSet) -> Self {
        Self {
            strategy: None,
            plugins,
        }
    }

    /// Builder-style strategy binding
    pub fn with_strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Swap the bound strategy between invocations
    pub fn set_strategy(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategy = Some(strategy);
    }

    /// Currently bound strategy
    pub fn strategy(&self) -> Option<&Arc<dyn Strategy>> {
        self.strategy.as_ref()
    }

    /// Run the bound strategy for `iterations` iterations
    pub fn execute(
        &self,
        engine: &mut dyn Engine,
        iterations: usize,
    ) -> Result<RawResult, HarnessError> {
        self.execute_with_cancel(engine, iterations, &Cancellation::new())
    }

    /// Run the bound strategy, stopping early once `cancel` fires
    pub fn execute_with_cancel(
        &self,
        engine: &mut dyn Engine,
        iterations: usize,
        cancel: &Cancellation,
    ) -> Result<RawResult, HarnessError> {
        let strategy = self.strategy.as_ref().ok_or(HarnessError::StrategyNotSet)?;
        let engine_name = engine.name().to_string();
        let test_type = strategy.test_type().to_string();

        self.plugins.notify_test_start(&engine_name, &test_type);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            strategy.run(&mut *engine, iterations, cancel)
        }));
        let raw = match outcome {
            Ok(result) => result?,
            Err(panic) => {
                return Err(HarnessError::StrategyPanicked {
                    engine: engine_name,
                    test_type,
                    message: panic_message(panic.as_ref()),
                });
            }
        };

        if raw.aborted {
            tracing::info!(
                engine = %engine_name,
                %test_type,
                completed = raw.iterations,
                requested = iterations,
                "run cancelled"
            );
        }

        self.plugins.notify_test_complete(&raw);
        Ok(raw)
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
