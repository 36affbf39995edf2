//! # brew-store
//!
//! Versioned document persistence for Brew POS, and the optimistic
//! transactions the fulfillment pipeline runs on top of it.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          brew-store                                     │
//! │                                                                         │
//! │   brew-engine ──► TransactionRunner ──► dyn DocumentStore               │
//! │                      │                        │                         │
//! │                      │ run_atomic:            ├── MemoryStore           │
//! │                      │  read + assert         │   (in-process)          │
//! │                      │  buffer writes         │                         │
//! │                      │  CAS commit            └── (remote backends      │
//! │                      │  retry on conflict          behind the same      │
//! │                      ▼                              trait)              │
//! │                  CommitSet                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store knows nothing about orders or ingredients; it moves JSON
//! values with version checks. Domain meaning lives in `brew-core`,
//! sequencing in `brew-engine`.

pub mod document;
pub mod error;
pub mod memory;
pub mod path;
pub mod store;
pub mod txn;

// Re-export the working set so callers can `use brew_store::{...}` directly.
pub use document::{Version, VersionedDocument};
pub use error::{StoreError, StoreResult, TxnError, TxnResult};
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocumentPath};
pub use store::{CommitSet, DocumentStore, DocumentWrite, ReadAssertion};
pub use txn::{RetryConfig, Transaction, TransactionRunner, TxnFuture};
