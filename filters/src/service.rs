//! Saved filter service
//!
//! Orchestrates the store, the caches, and the compiler. Read paths are
//! cache-first and degrade on store outages (a failed read logs and acts
//! like a miss or an empty list); write paths surface store errors and
//! invalidate the affected cache keys before returning.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::RequestContext;
use crate::cache::{CacheKey, CacheRegistry, TtlCache};
use crate::core::FiltersConfig;
use crate::error::FilterError;
use crate::filter::{
    AccessLevel, CompiledPredicate, EntityKind, FilterDefinition, FilterGroup, SavedFilter,
    compile, sanitize,
};
use crate::store::{FilterStore, SavedFilterRecord, StoreError};

/// Service over saved filters and filter groups
///
/// Holds three caches: filters by id, filter lists by scope key, and
/// assembled group lists by scope key. All three register with the
/// given registry so the shared sweeper maintains them.
pub struct SavedFilterService<S: FilterStore> {
    store: Arc<S>,
    filter_cache: Arc<TtlCache<i64, SavedFilter>>,
    filter_list_cache: Arc<TtlCache<String, Vec<SavedFilter>>>,
    group_list_cache: Arc<TtlCache<String, Vec<FilterGroup>>>,
}

impl<S: FilterStore + 'static> SavedFilterService<S> {
    pub fn new(store: Arc<S>, config: &FiltersConfig, registry: &CacheRegistry) -> Self {
        let filter_cache = Arc::new(TtlCache::new(
            "saved_filters",
            config.filter_cache_ttl(),
            config.filter_cache_max_entries,
        ));
        let filter_list_cache = Arc::new(TtlCache::new(
            "filter_lists",
            config.list_cache_ttl(),
            config.list_cache_max_entries,
        ));
        let group_list_cache = Arc::new(TtlCache::new(
            "group_lists",
            config.list_cache_ttl(),
            config.list_cache_max_entries,
        ));
        registry.register(filter_cache.clone());
        registry.register(filter_list_cache.clone());
        registry.register(group_list_cache.clone());
        Self {
            store,
            filter_cache,
            filter_list_cache,
            group_list_cache,
        }
    }

    /// Fetch one saved filter by id, cache-first
    ///
    /// A store outage is treated as a miss. A row whose definition fails
    /// to decode surfaces the error and is never cached, so a later fix
    /// in the store becomes visible immediately.
    pub async fn get_filter(&self, id: i64) -> Result<Option<SavedFilter>, FilterError> {
        if let Some(filter) = self.filter_cache.get(&id) {
            return Ok(Some(filter));
        }
        let record = match self.store.get_filter(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(id, error = %e, "Filter lookup failed, treating as missing");
                return Ok(None);
            }
        };
        let Some(record) = record else {
            return Ok(None);
        };
        let filter = decode_record(record)?;
        self.filter_cache.insert(id, filter.clone());
        Ok(Some(filter))
    }

    /// List the saved filters visible to the caller for one table
    ///
    /// `AccessLevel::None` short-circuits to an empty list. Levels that
    /// span all owners share one cache entry per table; own-only levels
    /// get a per-owner entry. Store outages degrade to an empty list.
    pub async fn list_filters(
        &self,
        ctx: &RequestContext,
        table_id: &str,
        access: AccessLevel,
    ) -> Vec<SavedFilter> {
        if !access.can_read() {
            return Vec::new();
        }
        let owner_scope = list_owner_scope(ctx, access);
        let key = CacheKey::filter_list(owner_scope, table_id, access);
        if let Some(filters) = self.filter_list_cache.get(&key) {
            return filters;
        }
        match self.load_filters(owner_scope, table_id).await {
            Ok(filters) => {
                self.filter_list_cache.insert(key, filters.clone());
                filters
            }
            Err(e) => {
                warn!(table_id, error = %e, "Filter list failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Fetch and decode a filter list from the store, sorted by order.
    /// Rows with undecodable definitions are skipped; a store failure is
    /// surfaced so callers can avoid caching a degraded result.
    async fn load_filters(
        &self,
        owner_id: Option<i64>,
        table_id: &str,
    ) -> Result<Vec<SavedFilter>, StoreError> {
        let records = self.store.list_filters(owner_id, table_id).await?;
        let mut filters: Vec<SavedFilter> = Vec::with_capacity(records.len());
        for record in records {
            match decode_record(record) {
                Ok(filter) => filters.push(filter),
                Err(e) => {
                    // One corrupt row must not hide the rest of the list
                    warn!(error = %e, "Skipping undecodable saved filter");
                }
            }
        }
        filters.sort_by_key(|f| f.order);
        Ok(filters)
    }

    /// List the filter groups visible to the caller, with their member
    /// filters attached in order
    pub async fn list_groups(
        &self,
        ctx: &RequestContext,
        table_id: &str,
        access: AccessLevel,
    ) -> Vec<FilterGroup> {
        if !access.can_read() {
            return Vec::new();
        }
        let owner_scope = list_owner_scope(ctx, access);
        let key = CacheKey::group_list(owner_scope, table_id, access);
        if let Some(groups) = self.group_list_cache.get(&key) {
            return groups;
        }
        let records = match self.store.list_groups(owner_scope, table_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(table_id, error = %e, "Group list failed, returning empty");
                return Vec::new();
            }
        };
        // Member filters come from the list cache or a fresh load. If the
        // load fails the group list is degraded, so it must not be cached:
        // memberless groups would otherwise be served until the TTL runs
        // out, well past the outage.
        let filter_key = CacheKey::filter_list(owner_scope, table_id, access);
        let filters = match self.filter_list_cache.get(&filter_key) {
            Some(filters) => filters,
            None => match self.load_filters(owner_scope, table_id).await {
                Ok(filters) => {
                    self.filter_list_cache.insert(filter_key, filters.clone());
                    filters
                }
                Err(e) => {
                    warn!(table_id, error = %e, "Filter list failed, returning empty");
                    return Vec::new();
                }
            },
        };
        let mut groups: Vec<FilterGroup> = records
            .into_iter()
            .map(|record| {
                let mut members: Vec<SavedFilter> = filters
                    .iter()
                    .filter(|f| f.group_id == Some(record.id))
                    .cloned()
                    .collect();
                members.sort_by_key(|f| f.order);
                FilterGroup {
                    id: record.id,
                    owner_id: record.owner_id,
                    table_id: record.table_id,
                    name: record.name,
                    order: record.order,
                    filters: members,
                }
            })
            .collect();
        groups.sort_by_key(|g| g.order);
        self.group_list_cache.insert(key, groups.clone());
        groups
    }

    /// Compile a saved filter into a sanitized predicate for the caller
    ///
    /// A missing filter compiles to no constraint rather than an error:
    /// a dashboard replaying a deleted filter should show everything its
    /// scoping allows, not break.
    pub async fn compile_saved(
        &self,
        id: i64,
        entity: EntityKind,
        ctx: &RequestContext,
    ) -> Result<CompiledPredicate, FilterError> {
        let Some(filter) = self.get_filter(id).await? else {
            debug!(id, "Saved filter missing, compiling to no constraint");
            return Ok(CompiledPredicate::Empty);
        };
        let predicate = compile(
            &filter.definition.conditions,
            &filter.definition.connectors,
            entity,
            ctx,
        )?;
        Ok(sanitize(predicate, ctx))
    }

    /// Create or update a saved filter, keyed by (owner, table, name)
    ///
    /// Saving under an existing name replaces that filter's definition
    /// and keeps its id, group membership, and order.
    pub async fn save_filter(
        &self,
        ctx: &RequestContext,
        table_id: &str,
        name: &str,
        definition: FilterDefinition,
    ) -> Result<SavedFilter, FilterError> {
        definition.validate()?;
        let encoded = definition.encode()?;
        let existing = self
            .store
            .find_filter_by_name(ctx.user_id, table_id, name)
            .await?;
        let record = match existing {
            Some(existing) => {
                self.store
                    .update_filter_definition(existing.id, &encoded)
                    .await?
            }
            None => {
                self.store
                    .create_filter(ctx.user_id, table_id, name, &encoded)
                    .await?
            }
        };
        let filter = decode_record(record)?;
        self.filter_cache.invalidate(&filter.id);
        self.invalidate_lists(ctx.user_id, table_id);
        Ok(filter)
    }

    /// Delete a saved filter owned by the caller
    pub async fn delete_filter(&self, ctx: &RequestContext, id: i64) -> Result<(), FilterError> {
        let record = self.store.get_filter(id).await?;
        let record = self.owned_filter(ctx, record, id)?;
        self.store.delete_filter(id).await?;
        self.filter_cache.invalidate(&id);
        self.invalidate_lists(record.owner_id, &record.table_id);
        Ok(())
    }

    /// Create a filter group at the end of the caller's group list
    pub async fn create_group(
        &self,
        ctx: &RequestContext,
        table_id: &str,
        name: &str,
    ) -> Result<FilterGroup, FilterError> {
        let siblings = self.store.list_groups(Some(ctx.user_id), table_id).await?;
        if siblings.iter().any(|g| g.name == name) {
            return Err(FilterError::Conflict(format!(
                "group '{}' already exists for this table",
                name
            )));
        }
        let order = siblings.iter().map(|g| g.order).max().unwrap_or(-1) + 1;
        let record = self
            .store
            .create_group(ctx.user_id, table_id, name, order)
            .await?;
        self.invalidate_lists(ctx.user_id, table_id);
        Ok(FilterGroup {
            id: record.id,
            owner_id: record.owner_id,
            table_id: record.table_id,
            name: record.name,
            order: record.order,
            filters: Vec::new(),
        })
    }

    /// Rename a group owned by the caller
    pub async fn rename_group(
        &self,
        ctx: &RequestContext,
        id: i64,
        name: &str,
    ) -> Result<(), FilterError> {
        let group = self.owned_group(ctx, id).await?;
        let siblings = self
            .store
            .list_groups(Some(group.owner_id), &group.table_id)
            .await?;
        if siblings.iter().any(|g| g.id != id && g.name == name) {
            return Err(FilterError::Conflict(format!(
                "group '{}' already exists for this table",
                name
            )));
        }
        self.store.rename_group(id, name).await?;
        self.invalidate_lists(group.owner_id, &group.table_id);
        Ok(())
    }

    /// Delete a group, detaching its filters first so they survive
    pub async fn delete_group(&self, ctx: &RequestContext, id: i64) -> Result<(), FilterError> {
        let group = self.owned_group(ctx, id).await?;
        self.store.detach_group_filters(id).await?;
        self.store.delete_group(id).await?;
        // Member filters changed too, so the filter cache may hold stale
        // group ids; clearing it is cheaper than finding each member.
        self.filter_cache.clear();
        self.invalidate_lists(group.owner_id, &group.table_id);
        Ok(())
    }

    /// Append a filter to a group, after the group's current members
    pub async fn add_filter_to_group(
        &self,
        ctx: &RequestContext,
        filter_id: i64,
        group_id: i64,
    ) -> Result<(), FilterError> {
        let record = self.store.get_filter(filter_id).await?;
        let record = self.owned_filter(ctx, record, filter_id)?;
        let group = self.owned_group(ctx, group_id).await?;
        if record.table_id != group.table_id {
            return Err(FilterError::Conflict(
                "filter and group belong to different tables".to_string(),
            ));
        }
        let members = self
            .store
            .list_filters(Some(group.owner_id), &group.table_id)
            .await?;
        let order = members
            .iter()
            .filter(|f| f.group_id == Some(group_id))
            .map(|f| f.order)
            .max()
            .unwrap_or(-1)
            + 1;
        self.store
            .set_filter_group(filter_id, Some(group_id), order)
            .await?;
        self.filter_cache.invalidate(&filter_id);
        self.invalidate_lists(record.owner_id, &record.table_id);
        Ok(())
    }

    /// Detach a filter from whatever group holds it
    pub async fn remove_filter_from_group(
        &self,
        ctx: &RequestContext,
        filter_id: i64,
    ) -> Result<(), FilterError> {
        let record = self.store.get_filter(filter_id).await?;
        let record = self.owned_filter(ctx, record, filter_id)?;
        self.store.set_filter_group(filter_id, None, 0).await?;
        self.filter_cache.invalidate(&filter_id);
        self.invalidate_lists(record.owner_id, &record.table_id);
        Ok(())
    }

    fn owned_filter(
        &self,
        ctx: &RequestContext,
        record: Option<SavedFilterRecord>,
        id: i64,
    ) -> Result<SavedFilterRecord, FilterError> {
        match record {
            Some(record) if record.owner_id == ctx.user_id || ctx.is_privileged() => Ok(record),
            // Not distinguishing "someone else's" from "absent" keeps ids
            // unprobeable across owners.
            _ => Err(FilterError::NotFound(format!("filter {}", id))),
        }
    }

    async fn owned_group(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<crate::store::FilterGroupRecord, FilterError> {
        match self.store.get_group(id).await? {
            Some(group) if group.owner_id == ctx.user_id || ctx.is_privileged() => Ok(group),
            _ => Err(FilterError::NotFound(format!("group {}", id))),
        }
    }

    /// Invalidate every list key a mutation could have touched
    ///
    /// Access level and owner scope are request-side facts unknown here,
    /// so all variants are dropped: the per-owner keys for the mutating
    /// owner plus the shared all-owner keys.
    fn invalidate_lists(&self, owner_id: i64, table_id: &str) {
        for access in AccessLevel::ALL {
            for scope in [Some(owner_id), None] {
                self.filter_list_cache
                    .invalidate(&CacheKey::filter_list(scope, table_id, access));
                self.group_list_cache
                    .invalidate(&CacheKey::group_list(scope, table_id, access));
            }
        }
    }
}

fn list_owner_scope(ctx: &RequestContext, access: AccessLevel) -> Option<i64> {
    if access.sees_all() {
        None
    } else {
        Some(ctx.user_id)
    }
}

fn decode_record(record: SavedFilterRecord) -> Result<SavedFilter, FilterError> {
    let definition = FilterDefinition::decode(&record.definition)?;
    Ok(SavedFilter {
        id: record.id,
        owner_id: record.owner_id,
        table_id: record.table_id,
        name: record.name,
        definition,
        group_id: record.group_id,
        order: record.order,
    })
}
