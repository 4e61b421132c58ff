//! Dynamic filter compilation
//!
//! Turns user-saved boolean combinations of column conditions into
//! backend query predicates:
//!
//! 1. Placeholders are resolved against the request context ([`placeholder`])
//! 2. Each condition resolves to a leaf via the column table ([`columns`])
//! 3. Leaves are grouped into an AND/OR tree ([`compiler`])
//! 4. Isolation-sensitive leaves are stripped for non-privileged
//!    principals ([`sanitizer`])

mod columns;
pub mod compiler;
pub mod placeholder;
pub mod predicate;
pub mod sanitizer;
pub mod types;

pub use compiler::{compile, compile_at};
pub use predicate::{CompiledPredicate, Leaf, LeafClass, SqlParams};
pub use sanitizer::sanitize;
pub use types::{
    AccessLevel, Connector, EntityKind, FilterCondition, FilterDefinition, FilterGroup,
    FilterValue, Operator, SavedFilter,
};
