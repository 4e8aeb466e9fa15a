//! Custom conversion registry
//!
//! Custom conversions are registered by name with a factory that accepts the
//! string arguments declared next to the field.

use crate::{Conversion, Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Type alias for a custom conversion factory
pub type ConversionFactory =
    Arc<dyn Fn(&[String]) -> Result<Box<dyn Conversion>> + Send + Sync>;

/// Name to factory table shared between materializers
#[derive(Clone, Default)]
pub struct ConversionRegistry {
    factories: Arc<DashMap<String, ConversionFactory>>,
}

impl ConversionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&[String]) -> Result<Box<dyn Conversion>> + Send + Sync + 'static,
    ) -> &Self {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Remove a factory, returning whether it was registered
    pub fn unregister(&self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate a custom conversion.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no factory is registered under
    /// `name`, or an instantiation error wrapping the factory's failure.
    pub fn create(&self, name: &str, args: &[String]) -> Result<Box<dyn Conversion>> {
        // Clone the factory out so the shard lock is not held while it runs
        let factory = self
            .factories
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Could not find a conversion named '{name}' accepting string arguments"
                ))
            })?;
        debug!(conversion = name, args = ?args, "Instantiating custom conversion");
        factory(args).map_err(|e| Error::Instantiation {
            name: name.to_string(),
            source: Box::new(e),
        })
    }
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("conversions", &self.names())
            .finish()
    }
}
