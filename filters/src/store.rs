//! Persistence boundary for saved filters and groups
//!
//! The service layer talks to storage only through [`FilterStore`].
//! Records carry the filter definition as its raw JSON text; decoding
//! and validation happen in the service so a malformed row surfaces as
//! a domain error instead of a storage error.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query failed after the store was reached
    #[error("Query failed: {0}")]
    Query(String),
}

/// A saved filter row as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFilterRecord {
    pub id: i64,
    pub owner_id: i64,
    pub table_id: String,
    pub name: String,
    /// Raw JSON of the filter definition
    pub definition: String,
    pub group_id: Option<i64>,
    pub order: i32,
}

/// A filter group row as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroupRecord {
    pub id: i64,
    pub owner_id: i64,
    pub table_id: String,
    pub name: String,
    pub order: i32,
}

/// Storage operations for saved filters and their groups
///
/// `owner_id: Option<i64>` on the list methods scopes the query: `Some`
/// restricts to that owner's rows, `None` spans all owners.
#[async_trait]
pub trait FilterStore: Send + Sync {
    async fn get_filter(&self, id: i64) -> Result<Option<SavedFilterRecord>, StoreError>;

    async fn find_filter_by_name(
        &self,
        owner_id: i64,
        table_id: &str,
        name: &str,
    ) -> Result<Option<SavedFilterRecord>, StoreError>;

    /// Insert a new filter; returns the stored record with its assigned id
    async fn create_filter(
        &self,
        owner_id: i64,
        table_id: &str,
        name: &str,
        definition: &str,
    ) -> Result<SavedFilterRecord, StoreError>;

    async fn update_filter_definition(
        &self,
        id: i64,
        definition: &str,
    ) -> Result<SavedFilterRecord, StoreError>;

    /// Move a filter into or out of a group, updating its order
    async fn set_filter_group(
        &self,
        id: i64,
        group_id: Option<i64>,
        order: i32,
    ) -> Result<(), StoreError>;

    async fn delete_filter(&self, id: i64) -> Result<(), StoreError>;

    async fn list_filters(
        &self,
        owner_id: Option<i64>,
        table_id: &str,
    ) -> Result<Vec<SavedFilterRecord>, StoreError>;

    async fn get_group(&self, id: i64) -> Result<Option<FilterGroupRecord>, StoreError>;

    async fn create_group(
        &self,
        owner_id: i64,
        table_id: &str,
        name: &str,
        order: i32,
    ) -> Result<FilterGroupRecord, StoreError>;

    async fn rename_group(&self, id: i64, name: &str) -> Result<FilterGroupRecord, StoreError>;

    async fn delete_group(&self, id: i64) -> Result<(), StoreError>;

    async fn list_groups(
        &self,
        owner_id: Option<i64>,
        table_id: &str,
    ) -> Result<Vec<FilterGroupRecord>, StoreError>;

    /// Clear `group_id` on every filter in the group, keeping the filters
    async fn detach_group_filters(&self, group_id: i64) -> Result<(), StoreError>;
}
