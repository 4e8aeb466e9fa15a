//! Materializer configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings consulted while materializing records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializerConfig {
    /// Fail when a name-bound field is missing from the headers
    pub strict_header_validation: bool,
}

impl MaterializerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_header_validation = strict;
        self
    }

    /// Load settings from YAML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the YAML is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::configuration_caused_by("Invalid materializer configuration", e))
    }
}
