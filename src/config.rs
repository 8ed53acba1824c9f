//! Configuration for lsmkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{LsmError, Result};

/// Main configuration for an lsmkv tree
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all level logs
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── 0/data          (level 0, youngest)
    ///     ├── 1/data
    ///     └── 2/data          (oldest)
    pub data_dir: PathBuf,

    /// fsync the level 0 log after every put
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// Capacity of level 0 (in distinct keys) before it is merged down
    pub threshold: u64,

    /// Capacity multiplier between adjacent levels
    pub growth_factor: u64,

    /// Number of levels in the tree
    pub level_count: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./lsmkv_data"),
            sync_writes: false,
            threshold: 10_000,
            growth_factor: 10,
            level_count: 3,
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the compaction policy cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(LsmError::Config("threshold must be at least 1".to_string()));
        }
        if self.growth_factor < 2 {
            return Err(LsmError::Config(format!(
                "growth factor must be at least 2, got {}",
                self.growth_factor
            )));
        }
        if self.level_count < 2 {
            return Err(LsmError::Config(format!(
                "a tree needs at least 2 levels, got {}",
                self.level_count
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all levels)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the level 0 capacity
    pub fn threshold(mut self, threshold: u64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the per-level capacity multiplier
    pub fn growth_factor(mut self, factor: u64) -> Self {
        self.config.growth_factor = factor;
        self
    }

    /// Set the number of levels
    pub fn level_count(mut self, count: usize) -> Self {
        self.config.level_count = count;
        self
    }

    /// fsync after every put
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
