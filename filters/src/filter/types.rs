//! Filter type definitions
//!
//! Conditions, connectors, operators, entity tags, and the versioned
//! definition schema saved filters are stored as.

use serde::{Deserialize, Serialize};

use crate::core::constants::FILTER_DEFINITION_VERSION;
use crate::error::FilterError;

/// Logical entities a filter can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Request,
    Task,
    Tour,
    TourBooking,
    Reservation,
}

/// Boolean connector between two consecutive conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

/// Comparison operator of a single condition
///
/// Which operators are legal depends on the column's semantic type;
/// an illegal pairing resolves to no constraint, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    Before,
    After,
    GreaterThan,
    LessThan,
}

/// Value carried by a condition
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One column condition inside a saved filter
///
/// The column stays a string at this layer: unknown columns must degrade
/// to no constraint at resolution time, not fail deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterCondition {
    pub column: String,
    pub operator: Operator,
    pub value: FilterValue,
}

/// Versioned storage schema for a filter's conditions and connectors
///
/// This is what the store persists as a JSON document. Decoding validates
/// the schema version and the connector-count invariant so that malformed
/// rows are caught at the storage boundary instead of at query time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterDefinition {
    #[serde(default = "default_version")]
    pub version: u32,
    pub conditions: Vec<FilterCondition>,
    pub connectors: Vec<Connector>,
}

fn default_version() -> u32 {
    FILTER_DEFINITION_VERSION
}

impl FilterDefinition {
    pub fn new(conditions: Vec<FilterCondition>, connectors: Vec<Connector>) -> Self {
        Self {
            version: FILTER_DEFINITION_VERSION,
            conditions,
            connectors,
        }
    }

    /// Decode and validate a stored definition
    pub fn decode(json: &str) -> Result<Self, FilterError> {
        let definition: Self = serde_json::from_str(json)
            .map_err(|e| FilterError::MalformedDefinition(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Encode for storage
    pub fn encode(&self) -> Result<String, FilterError> {
        serde_json::to_string(self).map_err(|e| FilterError::MalformedDefinition(e.to_string()))
    }

    /// Check the schema version and the connector-count invariant
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.version != FILTER_DEFINITION_VERSION {
            return Err(FilterError::UnsupportedVersion(self.version));
        }
        if self.connectors.len() != self.conditions.len().saturating_sub(1) {
            return Err(FilterError::ConnectorMismatch {
                conditions: self.conditions.len(),
                connectors: self.connectors.len(),
            });
        }
        Ok(())
    }
}

/// A filter a user saved for a table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SavedFilter {
    pub id: i64,
    pub owner_id: i64,
    pub table_id: String,
    pub name: String,
    pub definition: FilterDefinition,
    pub group_id: Option<i64>,
    pub order: i32,
}

/// A named, ordered group of saved filters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterGroup {
    pub id: i64,
    pub owner_id: i64,
    pub table_id: String,
    pub name: String,
    pub order: i32,
    pub filters: Vec<SavedFilter>,
}

/// Coarse visibility tier for enumerating saved filters and groups
///
/// Applied before any individual predicate is compiled; distinct from the
/// tenant-isolation sanitization of compiled predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    None,
    OwnRead,
    OwnBoth,
    AllRead,
    AllBoth,
}

impl AccessLevel {
    /// Every variant, for cross-variant cache invalidation
    pub const ALL: [AccessLevel; 5] = [
        AccessLevel::None,
        AccessLevel::OwnRead,
        AccessLevel::OwnBoth,
        AccessLevel::AllRead,
        AccessLevel::AllBoth,
    ];

    pub fn can_read(&self) -> bool {
        !matches!(self, AccessLevel::None)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, AccessLevel::OwnBoth | AccessLevel::AllBoth)
    }

    /// Whether the tier covers all owners' filters, not just the caller's
    pub fn sees_all(&self) -> bool {
        matches!(self, AccessLevel::AllRead | AccessLevel::AllBoth)
    }

    /// Stable label used in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::OwnRead => "own_read",
            AccessLevel::OwnBoth => "own_both",
            AccessLevel::AllRead => "all_read",
            AccessLevel::AllBoth => "all_both",
        }
    }
}
