//! Settings shared by the sort and annotate operations.
//!
//! Every key is optional in the TOML form; omitted keys keep their defaults.
//!
//! ```toml
//! sort_field = "sort_order"
//! property_suffix = "_property"
//! max_branches = 32767
//! ```

use crate::error::{AnnotateError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Default name of the computed field carrying the sort rank.
pub const DEFAULT_SORT_FIELD: &str = "sort_order";

/// Default suffix appended to attribute names when inferring an
/// annotation's output field.
pub const DEFAULT_PROPERTY_SUFFIX: &str = "_property";

/// Postgres accepts at most 65535 bind parameters and every branch binds two.
/// The Postgres backend also checks the total across a whole query.
pub const DEFAULT_MAX_BRANCHES: usize = u16::MAX as usize / 2;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotateConfig {
    pub sort_field: String,
    pub property_suffix: String,
    pub max_branches: usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            property_suffix: DEFAULT_PROPERTY_SUFFIX.to_string(),
            max_branches: DEFAULT_MAX_BRANCHES,
        }
    }
}

impl AnnotateConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| AnnotateError::Config(err.to_string()))
    }

    /// Read a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        debug!("Loaded annotate config from {}", path.display());
        Ok(config)
    }

    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = field.into();
        self
    }

    pub fn with_property_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.property_suffix = suffix.into();
        self
    }

    pub fn with_max_branches(mut self, max_branches: usize) -> Self {
        self.max_branches = max_branches;
        self
    }
}
