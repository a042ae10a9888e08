//! Configuration for magic map rendering and landmark search.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::DEFAULT_SEARCH_WORKERS;

/// Tunables read from the common config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicMapConfig {
    /// Whether render passes may look for landmarks at all.
    pub landmark_search_enabled: bool,
    /// Minimum number of ticks between two landmark scans of the same map.
    pub landmark_search_cooldown_ticks: u64,
    /// Search radius in blocks. Kept for config compatibility; the scan
    /// currently covers the visible window only.
    pub landmark_search_radius: u32,
    /// Size of the landmark search worker pool.
    pub search_workers: usize,
}

impl Default for MagicMapConfig {
    fn default() -> Self {
        Self {
            landmark_search_enabled: true,
            landmark_search_cooldown_ticks: 100,
            landmark_search_radius: 512,
            search_workers: DEFAULT_SEARCH_WORKERS,
        }
    }
}

impl MagicMapConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a config from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_workers == 0 {
            return Err(ConfigError::Invalid(
                "search_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Same config with landmark search switched off.
    pub fn without_search(mut self) -> Self {
        self.landmark_search_enabled = false;
        self
    }
}
