//! Engine configuration, persisted as TOML.
//!
//! ```toml
//! [discovery]
//! min_k = 0.9
//! parallel = true
//!
//! [inference]
//! max_steps = 10
//!
//! [units]
//! builtin = "physics"
//!
//! [units.table]
//! spring = [1, 0, -2, 0, 0]
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::DEFAULT_MIN_K;
use crate::infer::DEFAULT_MAX_STEPS;
use crate::units::{Dimension, DimensionalGuard, UnitTable};

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Minimum simplicity a relation needs to enter the graph.
    #[serde(default = "default_min_k")]
    pub min_k: f64,
    /// Search batches of candidates on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_min_k() -> f64 {
    DEFAULT_MIN_K
}
fn default_parallel() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_k: default_min_k(),
            parallel: default_parallel(),
        }
    }
}

/// Inference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Step budget for queries that do not set their own.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

/// Which built-in unit table seeds the guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinUnits {
    #[default]
    Physics,
    None,
}

/// Dimensional guard settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(default)]
    pub builtin: BuiltinUnits,
    /// Extra or overriding entries: label → `[M, L, T, I, Θ]` exponents.
    #[serde(default)]
    pub table: BTreeMap<String, Dimension>,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub units: UnitsConfig,
}

impl EngineConfig {
    /// Parse from TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let min_k = self.discovery.min_k;
        if !(min_k > 0.0 && min_k <= 1.0) {
            return Err(ConfigError::Invalid {
                message: format!("discovery.min_k must be in (0, 1], got {min_k}"),
            });
        }
        Ok(())
    }

    /// The unit table described by `[units]`, or `None` when it would be empty.
    pub fn unit_table(&self) -> Option<UnitTable> {
        let base = match self.units.builtin {
            BuiltinUnits::Physics => UnitTable::physics(),
            BuiltinUnits::None => UnitTable::new(),
        };
        let table = base.with_entries(
            self.units
                .table
                .iter()
                .map(|(label, dim)| (label.clone(), *dim)),
        );
        (!table.is_empty()).then_some(table)
    }

    pub fn guard(&self) -> DimensionalGuard {
        match self.unit_table() {
            Some(table) => DimensionalGuard::new(Arc::new(table)),
            None => DimensionalGuard::permissive(),
        }
    }
}
