//! Error types for shopfeed operations.

use crate::EntityKind;
use thiserror::Error;

/// Validation errors raised before any store or cache interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing or blank: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Errors from fetching or parsing the external product feed.
///
/// `Malformed` is fatal to the whole ingestion call; individual record
/// rejections during parsing are not errors and never surface here.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("I/O error reading feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed feed at byte {offset}: {reason}")]
    Malformed { offset: u64, reason: String },

    #[error("Feed fetch failed: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotFound {
            kind: EntityKind::Product,
            id: 12,
        };
        assert_eq!(err.to_string(), "product not found: 12");
    }

    #[test]
    fn test_feed_error_display_includes_offset() {
        let err = FeedError::Malformed {
            offset: 1024,
            reason: "unexpected byte".to_string(),
        };
        assert!(err.to_string().contains("1024"));
    }
}
