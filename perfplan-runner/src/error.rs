//! Error types

use crate::plugins::PluginError;
use perfplan_core::HarnessError;
use thiserror::Error;

/// Errors that abort a plan before or around execution
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Registry lookup or registration failed during setup
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// A plugin could not be constructed
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The unit worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
