//! Application constants

/// Cache key version prefix
///
/// Bump this to invalidate all cached filter data on schema changes.
pub const CACHE_KEY_VERSION: &str = "v1";

/// Current version of the stored filter definition schema
pub const FILTER_DEFINITION_VERSION: u32 = 1;

/// Default TTL for the filter-by-id cache (seconds)
pub const DEFAULT_FILTER_CACHE_TTL_SECS: u64 = 600;

/// Default capacity of the filter-by-id cache
pub const DEFAULT_FILTER_CACHE_MAX_ENTRIES: usize = 500;

/// Default TTL for filter-list and group-list caches (seconds)
///
/// Filter lists are fetched on every page load but change rarely.
pub const DEFAULT_LIST_CACHE_TTL_SECS: u64 = 300;

/// Default capacity of filter-list and group-list caches
pub const DEFAULT_LIST_CACHE_MAX_ENTRIES: usize = 1000;

/// Interval between cache sweeps (seconds)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Delay before the first cache sweep after startup (seconds)
///
/// Lets the process finish warming up before background work starts.
pub const DEFAULT_SWEEP_STARTUP_DELAY_SECS: u64 = 60;
