//! Filter engine configuration
//!
//! Designed to be embedded as a section of a larger application config.
//! Every field has a default so an empty section is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_FILTER_CACHE_MAX_ENTRIES, DEFAULT_FILTER_CACHE_TTL_SECS,
    DEFAULT_LIST_CACHE_MAX_ENTRIES, DEFAULT_LIST_CACHE_TTL_SECS,
    DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_SWEEP_STARTUP_DELAY_SECS,
};

/// Configuration for the filter caches and the background sweep
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// TTL for the filter-by-id cache, in seconds
    pub filter_cache_ttl_secs: u64,
    /// Maximum entries in the filter-by-id cache
    pub filter_cache_max_entries: usize,
    /// TTL for filter-list and group-list caches, in seconds
    pub list_cache_ttl_secs: u64,
    /// Maximum entries in filter-list and group-list caches
    pub list_cache_max_entries: usize,
    /// Interval between background cache sweeps, in seconds
    pub sweep_interval_secs: u64,
    /// Delay before the first sweep after startup, in seconds
    pub sweep_startup_delay_secs: u64,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            filter_cache_ttl_secs: DEFAULT_FILTER_CACHE_TTL_SECS,
            filter_cache_max_entries: DEFAULT_FILTER_CACHE_MAX_ENTRIES,
            list_cache_ttl_secs: DEFAULT_LIST_CACHE_TTL_SECS,
            list_cache_max_entries: DEFAULT_LIST_CACHE_MAX_ENTRIES,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            sweep_startup_delay_secs: DEFAULT_SWEEP_STARTUP_DELAY_SECS,
        }
    }
}

impl FiltersConfig {
    pub fn filter_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.filter_cache_ttl_secs)
    }

    pub fn list_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.list_cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_startup_delay(&self) -> Duration {
        Duration::from_secs(self.sweep_startup_delay_secs)
    }
}
