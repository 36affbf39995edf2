//! # Store Error Types
//!
//! Errors raised by the document store and the transaction layer on top
//! of it.
//!
//! `Conflict` is the load-bearing variant: it is how the store tells a
//! transaction that a document moved underneath it. The transaction runner
//! retries on it; every other variant propagates immediately.

use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Document store operation failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist at the given path.
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// A version check failed at commit: some document read by the
    /// transaction was written by someone else in the meantime.
    #[error("Version conflict at {path}")]
    Conflict { path: String },

    /// Insert-new found an existing document.
    #[error("Document already exists: {path}")]
    AlreadyExists { path: String },

    /// Document payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure (I/O, connectivity).
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the whole transaction could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

// =============================================================================
// Transaction Error
// =============================================================================

/// Failures surfaced by [`TransactionRunner::run_atomic`].
///
/// [`TransactionRunner::run_atomic`]: crate::txn::TransactionRunner::run_atomic
#[derive(Debug, Error)]
pub enum TxnError {
    /// Every attempt ended in a version conflict.
    #[error("Transaction conflicted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// A non-retryable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for Results with TxnError.
pub type TxnResult<T> = Result<T, TxnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_transient() {
        assert!(StoreError::Conflict {
            path: "shops/s1/ingredients/milk".to_string()
        }
        .is_transient());
        assert!(!StoreError::NotFound {
            path: "shops/s1/ingredients/milk".to_string()
        }
        .is_transient());
        assert!(!StoreError::Backend("socket closed".to_string()).is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = TxnError::Conflict { attempts: 5 };
        assert_eq!(err.to_string(), "Transaction conflicted after 5 attempts");
    }
}
