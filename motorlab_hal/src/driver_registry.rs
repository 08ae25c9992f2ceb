//! Board driver lookup by name.
//!
//! The binary selects its board with `--driver <name>`; the registry maps
//! that name to a factory. It is built explicitly at startup and passed
//! around by value, so tests can assemble their own.

use motorlab_common::hal::driver::{BoardDriver, DriverFactory, HalError};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Copy)]
struct DriverEntry {
    factory: DriverFactory,
    description: &'static str,
}

/// Named board driver factories, ordered by name.
#[derive(Default)]
pub struct DriverRegistry {
    entries: BTreeMap<&'static str, DriverEntry>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver factory under `name`.
    ///
    /// # Errors
    /// `HalError::ConfigError` if `name` is already taken.
    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        factory: DriverFactory,
    ) -> Result<(), HalError> {
        if self.entries.contains_key(name) {
            return Err(HalError::ConfigError(format!(
                "board driver '{name}' registered twice"
            )));
        }
        self.entries.insert(
            name,
            DriverEntry {
                factory,
                description,
            },
        );
        Ok(())
    }

    /// Instantiate the driver registered as `name`.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` for an unknown name.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn BoardDriver>, HalError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        debug!(driver = name, "Creating board driver");
        Ok((entry.factory)())
    }

    /// Registered driver names in order.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// `(name, description)` of every driver, in name order.
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries
            .iter()
            .map(|(&name, entry)| (name, entry.description))
    }
}
