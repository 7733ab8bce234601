//! Error types for the cadlink library

use thiserror::Error;

use crate::entities::EntityKind;
use crate::types::{DomainTable, ObjectId};

/// Main error type for cadlink operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Geometry has too few vertices (or is otherwise unusable) for its
    /// declared shape kind. Fatal to one entity only.
    #[error("malformed geometry for {kind:?}: expected at least {expected} vertices, got {actual}")]
    MalformedGeometry {
        kind: EntityKind,
        expected: usize,
        actual: usize,
    },

    /// A point sequence cannot be encoded as the requested shape kind.
    #[error("cannot encode {points} point(s) as {kind:?}")]
    UnencodableShape { kind: EntityKind, points: usize },

    /// Error parsing a WKT/EWKT geometry string
    #[error("WKT parse error: {0}")]
    WktParse(String),

    /// A layer-name token is not part of its closed vocabulary
    #[error("invalid layer token {token:?} for position {position}")]
    InvalidLayerToken { position: &'static str, token: String },

    /// Mapping table could not be loaded
    #[error("mapping table error: {0}")]
    MappingTable(String),

    /// Datastore constraint or connectivity failure
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A referenced domain object does not exist
    #[error("object not found: {table:?} id {id}")]
    ObjectNotFound { table: DomainTable, id: ObjectId },

    /// A transaction was required but none is open (or one is already open)
    #[error("transaction state error: {0}")]
    Transaction(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for cadlink operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<String> for BridgeError {
    fn from(s: String) -> Self {
        BridgeError::Custom(s)
    }
}

impl From<&str> for BridgeError {
    fn from(s: &str) -> Self {
        BridgeError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::MalformedGeometry {
            kind: EntityKind::Line,
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "malformed geometry for Line: expected at least 2 vertices, got 1"
        );
    }

    #[test]
    fn test_from_string() {
        let err: BridgeError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
