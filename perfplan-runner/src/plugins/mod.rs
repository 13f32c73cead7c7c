//! Plugins
//!
//! Plugins observe a plan run without taking part in pass/fail verdicts:
//! - `on_test_start` / `on_test_complete` bracket every executor invocation
//! - `test_plan_result` receives the completed report tree once
//!
//! Hooks are delivered through a [`PluginSet`]. A batch (every plugin's start
//! hook for one unit, or every plugin's complete hook) is delivered under one
//! lock in registration order, so concurrently running units never interleave
//! within a batch. A hook that errors or panics is logged and skipped for that
//! plugin only; the run always continues.

mod data_reporter;
mod metric_reporter;

pub use data_reporter::DataReporterPlugin;
pub use metric_reporter::MetricReporterPlugin;

use crate::executor::panic_message;
use perfplan_core::RawResult;
use perfplan_report::ReportTree;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors raised by plugins
#[derive(Debug, Error)]
pub enum PluginError {
    /// No builtin plugin has this name
    #[error("unknown plugin '{0}'")]
    UnknownPlugin(String),

    /// An option key the plugin does not recognize
    #[error("plugin '{plugin}' does not recognize option '{option}'")]
    UnrecognizedOption {
        /// Plugin name
        plugin: String,
        /// Offending key
        option: String,
    },

    /// A recognized option with an unusable value
    #[error("plugin '{plugin}': invalid value '{value}' for option '{option}'")]
    InvalidOption {
        /// Plugin name
        plugin: String,
        /// Option key
        option: String,
        /// Rejected value
        value: String,
    },

    /// A hook failed
    #[error("{0}")]
    Hook(String),

    /// Writing plugin output failed
    #[error("plugin I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a plugin is meant to run. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeScope {
    /// Controlling process
    #[default]
    Main,
    /// Worker processes
    Worker,
    /// Both
    Both,
}

impl std::fmt::Display for RuntimeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeScope::Main => write!(f, "MAIN"),
            RuntimeScope::Worker => write!(f, "WORKER"),
            RuntimeScope::Both => write!(f, "BOTH"),
        }
    }
}

/// String options passed to a plugin at construction
pub type PluginOptions = BTreeMap<String, String>;

/// Reject every option key not in `recognized`
pub fn validate_options(
    plugin: &str,
    options: &PluginOptions,
    recognized: &[&str],
) -> Result<(), PluginError> {
    match options.keys().find(|k| !recognized.contains(&k.as_str())) {
        Some(option) => Err(PluginError::UnrecognizedOption {
            plugin: plugin.to_string(),
            option: option.clone(),
        }),
        None => Ok(()),
    }
}

/// Lifecycle observer of a plan run
pub trait Plugin: Send {
    /// Unique plugin name
    fn name(&self) -> &str;

    /// Runtime scope tag
    fn runtime(&self) -> RuntimeScope {
        RuntimeScope::Main
    }

    /// Called before a strategy starts running against an engine
    fn on_test_start(&mut self, _engine: &str, _test_type: &str) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called with the raw result once a run returned
    fn on_test_complete(&mut self, _result: &RawResult) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once with the completed report tree
    fn test_plan_result(&mut self, _report: &ReportTree) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Deferred plugin constructor, invoked once at setup
pub type PluginBuilder = Box<dyn FnOnce() -> Result<Box<dyn Plugin>, PluginError> + Send>;

/// Construct a builtin plugin by name
pub fn builtin_plugin(name: &str, options: &PluginOptions) -> Result<Box<dyn Plugin>, PluginError> {
    match name {
        DataReporterPlugin::NAME => Ok(Box::new(DataReporterPlugin::new(options)?)),
        MetricReporterPlugin::NAME => Ok(Box::new(MetricReporterPlugin::new(options)?)),
        other => Err(PluginError::UnknownPlugin(other.to_string())),
    }
}

/// Ordered plugin list with isolated, serialized hook delivery
#[derive(Default)]
pub struct PluginSet {
    plugins: Mutex<Vec<Box<dyn Plugin>>>,
}

impl std::fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSet")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every builder once, in order
    pub fn build(builders: Vec<PluginBuilder>) -> Result<Self, PluginError> {
        let mut set = Self::new();
        for builder in builders {
            set.register(builder()?);
        }
        Ok(set)
    }

    /// Append a plugin; hooks fire in registration order
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!(
            plugin = plugin.name(),
            runtime = %plugin.runtime(),
            "registered plugin"
        );
        self.plugins
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plugin);
    }

    /// Plugin names in registration order
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|p| p.name().to_string()).collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `on_test_start` to every plugin
    pub fn notify_test_start(&self, engine: &str, test_type: &str) {
        self.deliver("on_test_start", |p| p.on_test_start(engine, test_type));
    }

    /// Deliver `on_test_complete` to every plugin
    pub fn notify_test_complete(&self, result: &RawResult) {
        self.deliver("on_test_complete", |p| p.on_test_complete(result));
    }

    /// Deliver `test_plan_result` to every plugin
    pub fn notify_test_plan_result(&self, report: &ReportTree) {
        self.deliver("test_plan_result", |p| p.test_plan_result(report));
    }

    /// Tear down every plugin
    pub fn into_plugins(self) -> Vec<Box<dyn Plugin>> {
        self.plugins
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn Plugin>>> {
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver<F>(&self, hook: &str, mut call: F)
    where
        F: FnMut(&mut dyn Plugin) -> Result<(), PluginError>,
    {
        let mut plugins = self.lock();
        for plugin in plugins.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| call(plugin.as_mut())));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(plugin = plugin.name(), hook, error = %e, "plugin hook failed");
                }
                Err(panic) => {
                    tracing::warn!(
                        plugin = plugin.name(),
                        hook,
                        panic = %panic_message(panic.as_ref()),
                        "plugin hook panicked"
                    );
                }
            }
        }
    }
}
