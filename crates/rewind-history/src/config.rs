/// Tracker configuration: defaults, JSON load/save, and sanitizing.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of history entries retained before the oldest is evicted.
const DEFAULT_CAPACITY: usize = 10;

/// Quiet period in milliseconds before a change is committed.
/// Zero records every distinct value synchronously.
const DEFAULT_DEBOUNCE_MS: u64 = 0;

/// File name used when no explicit config path is given.
const CONFIG_FILE_NAME: &str = "rewind.json";

/// Configuration for a `HistoryTracker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Max entries kept in the history log (at least 1).
    pub capacity: usize,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl TrackerConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self.sanitize();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.capacity = self.capacity.max(1);
    }

    /// Loads config from `path`.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Failed to load tracker config at {}: {e:#}", path.display());
                } else {
                    tracing::debug!("No tracker config at {}, using defaults", path.display());
                }
                Self::default()
            }
        }
    }

    /// Loads and sanitizes config from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: TrackerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

/// Resolves the config file path.
///
/// Resolution order:
/// 1. `REWIND_CONFIG` environment variable
/// 2. `rewind/rewind.json` under the platform config directory
/// 3. `rewind.json` in the working directory
pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("REWIND_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .map(|dir| dir.join("rewind").join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
