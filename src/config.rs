//! Run configuration, persisted as TOML.
//!
//! Every field has a serde default, so an empty file (or no file at all)
//! yields the stock 80/20 split and `[0.1, 0.5, 1.0, 1.5]` five-fold search.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sampling::StratifiedSampler;
use crate::search::SearchConfig;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration for training and evaluation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Seed for every random draw. Absent means entropy-seeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Directory holding `nb_model.json` and `test_data.json`.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Held-out split settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share of each class moved to the held-out test set.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}
fn default_test_fraction() -> f64 {
    0.2
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            seed: None,
            models_dir: default_models_dir(),
            split: SplitConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
        }
    }
}

impl SieveConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml().map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
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

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Sampler honoring the configured seed.
    pub fn sampler(&self) -> StratifiedSampler {
        match self.seed {
            Some(seed) => StratifiedSampler::seeded(seed),
            None => StratifiedSampler::from_entropy(),
        }
    }
}
