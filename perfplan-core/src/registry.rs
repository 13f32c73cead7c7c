//! Registry
//!
//! Name-keyed constructors for engines, driver configurations and strategies.
//! Every `create_*` call builds a fresh instance; nothing is memoized and
//! lookups never mutate the registry, so a populated registry can be shared
//! by reference across worker threads.
//!
//! Engine names are strict (a second registration is an error). Drivers and
//! strategies are overwritable: the later registration wins.

use crate::engine::{DEFAULT_WARMUP_TRADES, Engine};
use crate::error::{HarnessError, RegistryKind};
use crate::measure::Clock;
use crate::strategy::{LatencyConfig, LatencyStrategy, StressConfig, StressStrategy, Strategy};
use fxhash::FxHashMap;
use std::sync::Arc;

/// Builds engines of one kind
pub trait EngineFactory: Send + Sync {
    /// Name every created engine reports
    fn name(&self) -> &str;

    /// Build a fresh engine instance
    fn create(&self) -> Box<dyn Engine>;
}

struct FnEngineFactory<F> {
    name: String,
    build: F,
}

impl<F> EngineFactory for FnEngineFactory<F>
where
    F: Fn() -> Box<dyn Engine> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self) -> Box<dyn Engine> {
        (self.build)()
    }
}

/// Wrap a closure as an [`EngineFactory`]
pub fn engine_factory<F>(name: impl Into<String>, build: F) -> Box<dyn EngineFactory>
where
    F: Fn() -> Box<dyn Engine> + Send + Sync + 'static,
{
    Box::new(FnEngineFactory {
        name: name.into(),
        build,
    })
}

/// How an engine is stood up before a measured run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Driver name, `driver_<engine>` by convention
    pub name: String,
    /// Engine this driver wraps
    pub engine_name: String,
    /// Unmeasured trades executed before the strategy runs
    pub warmup_trades: usize,
}

impl DriverConfig {
    /// Conventional driver for an engine with the default warm-up
    pub fn for_engine(engine_name: impl Into<String>) -> Self {
        let engine_name = engine_name.into();
        Self {
            name: format!("driver_{}", engine_name),
            engine_name,
            warmup_trades: DEFAULT_WARMUP_TRADES,
        }
    }

    /// Override the warm-up length
    pub fn with_warmup(mut self, trades: usize) -> Self {
        self.warmup_trades = trades;
        self
    }
}

type DriverCtor = Box<dyn Fn() -> DriverConfig + Send + Sync>;
type StrategyCtor = Box<dyn Fn() -> Arc<dyn Strategy> + Send + Sync>;

/// Hash map that remembers insertion order of its keys
struct OrderedMap<V> {
    order: Vec<String>,
    entries: FxHashMap<String, V>,
}

impl<V> OrderedMap<V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: FxHashMap::default(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; a replaced key keeps its original position
    fn insert(&mut self, key: String, value: V) -> bool {
        let replaced = self.entries.insert(key.clone(), value).is_some();
        if !replaced {
            self.order.push(key);
        }
        replaced
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.order.clone()
    }
}

/// Constructors for everything a test unit needs
pub struct Registry {
    engines: OrderedMap<Box<dyn EngineFactory>>,
    drivers: OrderedMap<DriverCtor>,
    strategies: OrderedMap<StrategyCtor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("engines", &self.engines.order)
            .field("drivers", &self.drivers.order)
            .field("strategies", &self.strategies.order)
            .finish()
    }
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            engines: OrderedMap::new(),
            drivers: OrderedMap::new(),
            strategies: OrderedMap::new(),
        }
    }

    /// Registry pre-populated with the latency and stress strategies
    pub fn with_default_strategies(
        latency: LatencyConfig,
        stress: StressConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut registry = Self::new();
        let latency_clock = clock.clone();
        registry.register_strategy(LatencyStrategy::TEST_TYPE, move || {
            Arc::new(LatencyStrategy::new(latency, latency_clock.clone()))
        });
        registry.register_strategy(StressStrategy::TEST_TYPE, move || {
            Arc::new(StressStrategy::new(stress, clock.clone()))
        });
        registry
    }

    /// Register an engine factory under its own name
    pub fn register_engine(&mut self, factory: Box<dyn EngineFactory>) -> Result<(), HarnessError> {
        let name = factory.name().to_string();
        if self.engines.contains(&name) {
            return Err(HarnessError::DuplicateRegistration {
                kind: RegistryKind::Engine,
                key: name,
            });
        }
        tracing::debug!(engine = %name, "registered engine");
        self.engines.insert(name, factory);
        Ok(())
    }

    /// Register a driver constructor; replaces any previous one
    pub fn register_driver<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> DriverConfig + Send + Sync + 'static,
    {
        let name = name.into();
        if self.drivers.insert(name.clone(), Box::new(ctor)) {
            tracing::debug!(driver = %name, "replaced driver registration");
        } else {
            tracing::debug!(driver = %name, "registered driver");
        }
    }

    /// Register a strategy constructor; replaces any previous one
    pub fn register_strategy<F>(&mut self, test_type: impl Into<String>, ctor: F)
    where
        F: Fn() -> Arc<dyn Strategy> + Send + Sync + 'static,
    {
        let test_type = test_type.into();
        if self.strategies.insert(test_type.clone(), Box::new(ctor)) {
            tracing::debug!(%test_type, "replaced strategy registration");
        } else {
            tracing::debug!(%test_type, "registered strategy");
        }
    }

    /// Build a fresh engine
    pub fn create_engine(&self, name: &str) -> Result<Box<dyn Engine>, HarnessError> {
        self.engines
            .get(name)
            .map(|factory| factory.create())
            .ok_or_else(|| unknown(RegistryKind::Engine, name))
    }

    /// Build a driver configuration
    pub fn create_driver_config(&self, name: &str) -> Result<DriverConfig, HarnessError> {
        self.drivers
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| unknown(RegistryKind::Driver, name))
    }

    /// Build a strategy
    pub fn create_strategy(&self, test_type: &str) -> Result<Arc<dyn Strategy>, HarnessError> {
        self.strategies
            .get(test_type)
            .map(|ctor| ctor())
            .ok_or_else(|| unknown(RegistryKind::Strategy, test_type))
    }

    /// Engine names in registration order
    pub fn list_engines(&self) -> Vec<String> {
        self.engines.keys()
    }

    /// Driver names in registration order
    pub fn list_drivers(&self) -> Vec<String> {
        self.drivers.keys()
    }

    /// Strategy test types in registration order
    pub fn list_strategies(&self) -> Vec<String> {
        self.strategies.keys()
    }
}

fn unknown(kind: RegistryKind, key: &str) -> HarnessError {
    HarnessError::UnknownKey {
        kind,
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{ScriptedEngine, SimulatedEngine};
    use crate::measure::{ManualClock, MonotonicClock};

    fn scripted(name: &'static str) -> Box<dyn EngineFactory> {
        let clock = Arc::new(ManualClock::new());
        engine_factory(name, move || {
            Box::new(ScriptedEngine::new(name, clock.clone())) as Box<dyn Engine>
        })
    }

    #[test]
    fn test_duplicate_engine_rejected() {
        let mut registry = Registry::new();
        registry.register_engine(scripted("Alpha")).unwrap();

        let err = registry.register_engine(scripted("Alpha")).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::DuplicateRegistration {
                kind: RegistryKind::Engine,
                ..
            }
        ));
        assert_eq!(registry.list_engines(), vec!["Alpha"]);
    }

    #[test]
    fn test_driver_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register_driver("driver_Alpha", || DriverConfig::for_engine("Alpha"));
        registry.register_driver("driver_Alpha", || {
            DriverConfig::for_engine("Alpha").with_warmup(7)
        });

        let driver = registry.create_driver_config("driver_Alpha").unwrap();
        assert_eq!(driver.warmup_trades, 7);
        assert_eq!(driver.engine_name, "Alpha");
        assert_eq!(registry.list_drivers(), vec!["driver_Alpha"]);
    }

    #[test]
    fn test_unknown_keys() {
        let registry = Registry::new();

        let err = registry.create_engine("Nope").err().unwrap();
        assert_eq!(err.to_string(), "Unknown engine: Nope");
        let err = registry.create_driver_config("driver_Nope").unwrap_err();
        assert_eq!(err.to_string(), "Unknown engine driver: driver_Nope");
        let err = registry.create_strategy("soak").err().unwrap();
        assert_eq!(err.to_string(), "Unknown test type strategy: soak");
        assert!(err.is_configuration_error());

        // A miss never registers anything
        assert!(registry.list_engines().is_empty());
        assert!(registry.list_drivers().is_empty());
        assert!(registry.list_strategies().is_empty());
    }

    #[test]
    fn test_create_returns_fresh_instances() {
        let mut registry = Registry::new();
        registry
            .register_engine(engine_factory("AlphaEngine", || {
                Box::new(SimulatedEngine::alpha()) as Box<dyn Engine>
            }))
            .unwrap();

        let mut first = registry.create_engine("AlphaEngine").unwrap();
        first.execute_trade(&crate::engine::Order::probe()).unwrap();
        let second = registry.create_engine("AlphaEngine").unwrap();

        assert_eq!(second.name(), "AlphaEngine");
        assert_eq!(registry.list_engines(), vec!["AlphaEngine"]);
    }

    #[test]
    fn test_listing_keeps_registration_order() {
        let mut registry = Registry::new();
        for name in ["Gamma", "Alpha", "Beta"] {
            registry.register_engine(scripted(name)).unwrap();
        }
        assert_eq!(registry.list_engines(), vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_default_strategies() {
        let registry = Registry::with_default_strategies(
            LatencyConfig::default(),
            StressConfig::default(),
            Arc::new(MonotonicClock::new()),
        );

        assert_eq!(registry.list_strategies(), vec!["latency", "stress"]);
        assert_eq!(
            registry.create_strategy("stress").unwrap().test_type(),
            "stress"
        );
    }

    #[test]
    fn test_strategy_overwrite() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new());
        let mut registry = Registry::with_default_strategies(
            LatencyConfig::default(),
            StressConfig::default(),
            clock.clone(),
        );
        registry.register_strategy("latency", move || {
            Arc::new(StressStrategy::new(StressConfig::default(), clock.clone()))
        });

        assert_eq!(
            registry.create_strategy("latency").unwrap().test_type(),
            "stress"
        );
        assert_eq!(registry.list_strategies(), vec!["latency", "stress"]);
    }
}
