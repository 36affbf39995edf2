//! # DocumentStore Trait
//!
//! The storage seam of the system. Everything above this trait (the
//! reservation engine, revenue aggregation, loyalty) speaks only
//! `dyn DocumentStore`; everything below it is a backend.
//!
//! ## Consistency Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  snapshot(paths)   read current versions, no locks taken                │
//! │                                                                         │
//! │  commit(set)       ATOMIC: verify every ReadAssertion, then apply       │
//! │                    every write, all-or-nothing. A failed assertion      │
//! │                    applies nothing and returns Conflict.                │
//! │                                                                         │
//! │  create(path, v)   insert-new, fails on an existing document            │
//! │  list(collection)  every document in a collection                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is optimistic concurrency: readers never block, writers detect
//! interference at commit time and retry. The contract matches what
//! hosted document databases give a grouped read-modify-write, so a
//! remote backend can slot in behind the same trait later.

use async_trait::async_trait;

use crate::document::{Version, VersionedDocument};
use crate::error::StoreResult;
use crate::path::{CollectionPath, DocumentPath};

// =============================================================================
// Commit Set
// =============================================================================

/// "I read this document at this version", or, with `version: None`,
/// "I looked and it was absent".
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAssertion {
    pub path: DocumentPath,
    pub version: Option<Version>,
}

/// A full-document write staged by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub path: DocumentPath,
    pub value: serde_json::Value,
}

/// Everything a transaction hands to `commit`: what it read (with the
/// versions it saw) and what it wants to write.
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    pub assertions: Vec<ReadAssertion>,
    pub writes: Vec<DocumentWrite>,
}

impl CommitSet {
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty() && self.writes.is_empty()
    }
}

// =============================================================================
// DocumentStore
// =============================================================================

/// A versioned document store with compare-and-swap commits.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the documents at `paths`, in order. Missing documents come
    /// back as `None`.
    async fn snapshot(&self, paths: &[DocumentPath]) -> StoreResult<Vec<Option<VersionedDocument>>>;

    /// Atomically verifies every assertion and applies every write.
    ///
    /// If any asserted document is no longer at the version the caller
    /// saw (including "was absent, now exists"), nothing is applied and
    /// [`StoreError::Conflict`] names the first moved document.
    ///
    /// [`StoreError::Conflict`]: crate::error::StoreError::Conflict
    async fn commit(&self, set: CommitSet) -> StoreResult<()>;

    /// Inserts a new document at `path`, failing with
    /// [`StoreError::AlreadyExists`] if one is present.
    ///
    /// [`StoreError::AlreadyExists`]: crate::error::StoreError::AlreadyExists
    async fn create(&self, path: &DocumentPath, value: serde_json::Value) -> StoreResult<()>;

    /// All documents in `collection`, ordered by document id.
    async fn list(&self, collection: &CollectionPath) -> StoreResult<Vec<VersionedDocument>>;

    /// Reads a single document. Convenience over [`snapshot`].
    ///
    /// [`snapshot`]: DocumentStore::snapshot
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<VersionedDocument>> {
        let mut docs = self.snapshot(std::slice::from_ref(path)).await?;
        Ok(docs.pop().flatten())
    }
}
