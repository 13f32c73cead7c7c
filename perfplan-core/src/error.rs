//! Error types

use crate::engine::{Capability, OperationKind};
use thiserror::Error;

/// Which registry mapping a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    /// Engine constructors
    Engine,
    /// Driver configuration constructors
    Driver,
    /// Strategy constructors
    Strategy,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryKind::Engine => write!(f, "engine"),
            RegistryKind::Driver => write!(f, "engine driver"),
            RegistryKind::Strategy => write!(f, "test type strategy"),
        }
    }
}

/// Errors raised by harness setup and strategy execution
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// A strict registry key was registered twice
    #[error("{kind} '{key}' already registered")]
    DuplicateRegistration {
        /// Registry mapping
        kind: RegistryKind,
        /// Offending key
        key: String,
    },

    /// Lookup of an unregistered name
    #[error("Unknown {kind}: {key}")]
    UnknownKey {
        /// Registry mapping
        kind: RegistryKind,
        /// Missing key
        key: String,
    },

    /// The bound engine lacks an operation the strategy depends on
    #[error("engine '{engine}' lacks capability `{capability}` required by the {test_type} strategy")]
    MissingCapability {
        /// Engine name
        engine: String,
        /// Strategy test type
        test_type: String,
        /// Missing capability
        capability: Capability,
    },

    /// An iteration or probe failed while the strategy was running
    #[error("{test_type} strategy failed on engine '{engine}' at iteration {iteration}: {message}")]
    StrategyExecution {
        /// Engine name
        engine: String,
        /// Strategy test type
        test_type: String,
        /// 0-based iteration that failed
        iteration: usize,
        /// Underlying failure
        message: String,
    },

    /// The strategy panicked while running
    #[error("{test_type} strategy panicked on engine '{engine}': {message}")]
    StrategyPanicked {
        /// Engine name
        engine: String,
        /// Strategy test type
        test_type: String,
        /// Panic payload
        message: String,
    },

    /// `execute` was called before a strategy was bound
    #[error("no strategy bound to executor")]
    StrategyNotSet,
}

impl HarnessError {
    /// Configuration mistakes abort setup; everything else is a per-unit failure
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HarnessError::DuplicateRegistration { .. } | HarnessError::UnknownKey { .. }
        )
    }
}

/// Errors reported by engines
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine refused the order
    #[error("trade rejected: {0}")]
    Rejected(String),

    /// An I/O probe failed
    #[error("{kind} operation failed: {source}")]
    Io {
        /// Probe kind
        kind: OperationKind,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Any other engine fault
    #[error("engine fault: {0}")]
    Fault(String),
}
