use thiserror::Error;

use crate::models::{ObjectId, TxnId};

/// Main error type for Quarry operations
#[derive(Error, Debug)]
pub enum QuarryError {
    #[error("Index object must not be null")]
    NullIndexObject,

    #[error("Transaction {0} is read-only")]
    ReadOnly(TxnId),

    #[error("Unknown cell store: {0}")]
    UnknownCellStore(u32),

    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("Corrupt value: {0}")]
    CorruptValue(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Check if this error indicates a transient failure that could be retried
    pub fn is_retriable(&self) -> bool {
        matches!(self, QuarryError::Storage(_) | QuarryError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuarryError::UnknownCellStore(42);
        assert_eq!(err.to_string(), "Unknown cell store: 42");

        let err = QuarryError::ReadOnly(TxnId(7));
        assert_eq!(err.to_string(), "Transaction txn#7 is read-only");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(QuarryError::Storage("disk full".to_string()).is_retriable());
        assert!(!QuarryError::NullIndexObject.is_retriable());
        assert!(!QuarryError::CorruptValue("bad".to_string()).is_retriable());
    }
}
