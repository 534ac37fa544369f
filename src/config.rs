//! Builder configuration (JSON, same serde path used for every artifact)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::registry::{CountryEntry, CountryRegistry};

/// Set (to any value) to force sequential subtree construction
pub const SEQUENTIAL_ENV: &str = "SHADOW_ATLAS_SEQUENTIAL";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtlasConfig {
    /// Build per-country subtrees on the rayon pool
    pub parallel: bool,
    /// Registry entries added to / replacing the built-in table
    pub country_overrides: Vec<CountryEntry>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            country_overrides: Vec::new(),
        }
    }
}

impl AtlasConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.country_overrides {
            if entry.code.is_empty() || entry.continent.is_empty() {
                return Err(AtlasError::Config(format!(
                    "country override {:?} needs a code and a continent",
                    entry
                )));
            }
        }
        Ok(())
    }

    /// Parallelism after applying the environment override
    pub fn effective_parallel(&self) -> bool {
        self.parallel && std::env::var_os(SEQUENTIAL_ENV).is_none()
    }

    /// Built-in registry with this config's overrides applied
    pub fn registry(&self) -> CountryRegistry {
        CountryRegistry::builtin().with_overrides(self.country_overrides.iter().cloned())
    }
}
