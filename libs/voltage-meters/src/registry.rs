//! Driver Registry
//!
//! Maps a meter model name to the factory that builds its producer.
//!
//! ## Usage
//!
//! Adding a new meter model requires only 2 changes:
//! 1. Write the driver module (opcode table + `Producer` impl)
//! 2. Add its `(MODEL, factory)` pair to [`BUILTIN_DRIVERS`]

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::drivers::{pqplus, sdm, PqPlusProducer, SdmProducer};
use crate::error::{MeterError, Result};
use crate::producer::{validate_producer, DriverOptions, Producer};

/// Producer constructor registered per model
pub type ProducerFactory = fn(&DriverOptions) -> Box<dyn Producer>;

/// Every compiled-in driver
pub const BUILTIN_DRIVERS: &[(&str, ProducerFactory)] = &[
    (pqplus::MODEL, PqPlusProducer::factory),
    (sdm::MODEL, SdmProducer::factory),
];

/// Registry of meter drivers
///
/// Uses DashMap for thread-safe concurrent lookups. Names are
/// case-sensitive and can be registered only once.
pub struct DriverRegistry {
    factories: DashMap<String, ProducerFactory>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Create a registry holding all built-in drivers
    pub fn with_builtin_drivers() -> Result<Self> {
        let registry = Self::new();
        for (name, factory) in BUILTIN_DRIVERS {
            registry.register(name, *factory)?;
        }
        info!("Registered {} meter drivers", registry.factories.len());
        Ok(registry)
    }

    /// Register a driver factory
    ///
    /// The factory is exercised once with default options and the resulting
    /// producer must be self-consistent, so table defects fail here rather
    /// than during polling. A name that is already taken is rejected.
    pub fn register(&self, name: &str, factory: ProducerFactory) -> Result<()> {
        match self.factories.entry(name.to_string()) {
            Entry::Occupied(_) => Err(MeterError::DuplicateDriver(name.to_string())),
            Entry::Vacant(slot) => {
                validate_producer(factory(&DriverOptions::default()).as_ref())?;
                slot.insert(factory);
                debug!("Registered meter driver {}", name);
                Ok(())
            },
        }
    }

    /// Build a producer with default options
    ///
    /// Returns `None` for unregistered names.
    pub fn lookup(&self, name: &str) -> Option<Box<dyn Producer>> {
        self.factories
            .get(name)
            .map(|factory| factory(&DriverOptions::default()))
    }

    /// Build a producer with device-specific options
    pub fn create(&self, name: &str, options: &DriverOptions) -> Result<Box<dyn Producer>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| MeterError::UnknownDriver(name.to_string()))?;
        Ok(factory(options))
    }

    /// Check if a driver is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered model names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

static GLOBAL: LazyLock<DriverRegistry> =
    LazyLock::new(|| match DriverRegistry::with_builtin_drivers() {
        Ok(registry) => registry,
        Err(e) => panic!("invalid built-in meter driver: {}", e),
    });

/// Process-wide registry of built-in drivers
pub fn global() -> &'static DriverRegistry {
    &GLOBAL
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::measurement::Measurement;
    use crate::opcodes::Opcodes;
    use crate::operation::{FunctionCode, Operation};
    use crate::producer::Snip;

    struct TablelessProducer(Opcodes);

    impl Producer for TablelessProducer {
        fn description(&self) -> &'static str {
            "tableless"
        }

        fn opcodes(&self) -> &Opcodes {
            &self.0
        }

        fn probe(&self) -> Result<Operation> {
            Snip::new(&self.0, FunctionCode::ReadHoldingRegisters)
                .float32(Measurement::VoltageL1, None)
        }

        fn produce(&self) -> Result<Vec<Operation>> {
            Ok(vec![self.probe()?])
        }
    }

    fn tableless(_: &DriverOptions) -> Box<dyn Producer> {
        Box::new(TablelessProducer(Opcodes::default()))
    }

    fn repeated_row(_: &DriverOptions) -> Box<dyn Producer> {
        Box::new(TablelessProducer(Opcodes::from([
            (Measurement::VoltageL1, 0x1100),
            (Measurement::VoltageL1, 0x2000),
        ])))
    }

    #[test]
    fn test_repeated_table_row_is_rejected() {
        let registry = DriverRegistry::new();
        let err = registry.register("REPEATED", repeated_row).unwrap_err();
        assert_eq!(
            err,
            MeterError::DuplicateOpcode {
                measurement: Measurement::VoltageL1
            }
        );
        assert!(!registry.is_registered("REPEATED"));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = DriverRegistry::with_builtin_drivers().unwrap();
        assert_eq!(registry.names(), vec!["PQPLUS".to_string(), "SDM".to_string()]);
        assert!(registry.is_registered("PQPLUS"));
        // names are case-sensitive
        assert!(!registry.is_registered("pqplus"));
    }

    #[test]
    fn test_lookup_returns_matching_driver() {
        let registry = DriverRegistry::with_builtin_drivers().unwrap();
        assert_eq!(
            registry.lookup("PQPLUS").unwrap().description(),
            "PQ Plus meters and power quality analyzers"
        );
        assert_eq!(
            registry.lookup("SDM").unwrap().description(),
            "Eastron SDM630 three-phase meters"
        );
        assert!(registry.lookup("ABB").is_none());
    }

    #[test]
    fn test_create_unknown_driver() {
        let registry = DriverRegistry::new();
        let err = registry
            .create("PQPLUS", &DriverOptions::default())
            .err()
            .unwrap();
        assert_eq!(err, MeterError::UnknownDriver("PQPLUS".to_string()));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = DriverRegistry::new();
        registry.register("PQPLUS", PqPlusProducer::factory).unwrap();
        let err = registry.register("PQPLUS", SdmProducer::factory).unwrap_err();
        assert_eq!(err, MeterError::DuplicateDriver("PQPLUS".to_string()));
        // first registration still wins
        assert_eq!(
            registry.lookup("PQPLUS").unwrap().description(),
            "PQ Plus meters and power quality analyzers"
        );
    }

    #[test]
    fn test_inconsistent_driver_is_rejected() {
        let registry = DriverRegistry::new();
        let err = registry.register("BROKEN", tableless).unwrap_err();
        assert!(err.is_driver_defect());
        assert!(!registry.is_registered("BROKEN"));
    }

    #[test]
    fn test_global_registry() {
        assert!(global().is_registered("SDM"));
        let a = global().lookup("SDM").unwrap();
        let b = global().lookup("SDM").unwrap();
        assert_eq!(a.produce().unwrap(), b.produce().unwrap());
    }
}
