//! Filter engine error types

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum FilterError {
    /// The connector list does not pair up with the condition list.
    /// Never repaired: a caller sending this has a bug upstream.
    #[error("connector count mismatch: {conditions} conditions require {} connectors, got {connectors}", conditions.saturating_sub(1))]
    ConnectorMismatch {
        conditions: usize,
        connectors: usize,
    },

    /// A persisted filter definition failed to decode
    #[error("malformed filter definition: {0}")]
    MalformedDefinition(String),

    /// A persisted filter definition carries a schema version this build does not know
    #[error("unsupported filter definition version: {0}")]
    UnsupportedVersion(u32),

    /// A write path hit the persistent store and failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A named filter or group already exists where uniqueness is required
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced filter or group does not exist or is not owned by the caller
    #[error("not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_mismatch_display() {
        let err = FilterError::ConnectorMismatch {
            conditions: 3,
            connectors: 1,
        };
        assert_eq!(
            err.to_string(),
            "connector count mismatch: 3 conditions require 2 connectors, got 1"
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = FilterError::MalformedDefinition("expected value at line 1".to_string());
        assert_eq!(
            err.to_string(),
            "malformed filter definition: expected value at line 1"
        );
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = FilterError::UnsupportedVersion(7);
        assert_eq!(err.to_string(), "unsupported filter definition version: 7");
    }
}
