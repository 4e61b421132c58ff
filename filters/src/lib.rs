//! Dynamic filter compilation engine
//!
//! Users save column conditions joined by AND/OR connectors; this crate
//! turns those saved definitions into parameterized query predicates at
//! request time. Placeholders like `__TODAY__` or `__CURRENT_BRANCH__`
//! resolve against the calling context, unknown columns and unresolvable
//! values degrade to no constraint, and isolation-sensitive constraints
//! are stripped for non-privileged callers before the predicate reaches
//! the store.
//!
//! Around the compiler sits a [`service::SavedFilterService`] that loads,
//! lists, groups, and upserts saved filters through a [`store::FilterStore`]
//! implementation, fronted by TTL caches swept from a shared registry.

pub mod auth;
pub mod cache;
pub mod core;
pub mod error;
pub mod filter;
pub mod service;
pub mod store;
pub mod utils;

pub use auth::RequestContext;
pub use cache::{CacheRegistry, spawn_sweeper};
pub use self::core::FiltersConfig;
pub use error::FilterError;
pub use filter::{
    AccessLevel, CompiledPredicate, Connector, EntityKind, FilterCondition, FilterDefinition,
    FilterGroup, FilterValue, Operator, SavedFilter, SqlParams, compile, compile_at, sanitize,
};
pub use service::SavedFilterService;
pub use store::{FilterGroupRecord, FilterStore, SavedFilterRecord, StoreError};
