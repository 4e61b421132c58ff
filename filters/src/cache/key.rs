//! Cache key construction
//!
//! Keys carry a version prefix so a format change invalidates the whole
//! keyspace at once instead of serving stale shapes.

use crate::core::constants::CACHE_KEY_VERSION;
use crate::filter::types::AccessLevel;

/// Builds the string keys used by the list caches
///
/// List keys encode the visibility scope: a per-owner key for users who
/// only see their own rows, and a shared `all` key for users whose access
/// level spans every owner.
pub struct CacheKey;

impl CacheKey {
    /// Key for a single saved filter by id
    pub fn filter(id: i64) -> String {
        format!("{}:filter:{}", CACHE_KEY_VERSION, id)
    }

    /// Key for a filter list
    pub fn filter_list(owner_id: Option<i64>, table_id: &str, access: AccessLevel) -> String {
        match owner_id {
            Some(owner_id) => format!(
                "{}:filters:user:{}:{}:{}",
                CACHE_KEY_VERSION,
                owner_id,
                table_id,
                access.as_str()
            ),
            None => format!(
                "{}:filters:all:{}:{}",
                CACHE_KEY_VERSION,
                table_id,
                access.as_str()
            ),
        }
    }

    /// Key for a group list
    pub fn group_list(owner_id: Option<i64>, table_id: &str, access: AccessLevel) -> String {
        match owner_id {
            Some(owner_id) => format!(
                "{}:groups:user:{}:{}:{}",
                CACHE_KEY_VERSION,
                owner_id,
                table_id,
                access.as_str()
            ),
            None => format!(
                "{}:groups:all:{}:{}",
                CACHE_KEY_VERSION,
                table_id,
                access.as_str()
            ),
        }
    }
}
