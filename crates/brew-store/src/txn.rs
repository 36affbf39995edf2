//! # Optimistic Transactions
//!
//! Read-track-commit transactions over a [`DocumentStore`], with bounded
//! conflict retry.
//!
//! ## How a Transaction Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  run_atomic(store, body)                                                │
//! │                                                                         │
//! │  loop {                                                                 │
//! │      tx = fresh Transaction                                             │
//! │      body(&mut tx)        reads record (path, version) assertions       │
//! │          │                writes are buffered, nothing touches store    │
//! │          ├── Err(domain)  ──► return Err    (nothing committed)         │
//! │          ▼                                                              │
//! │      store.commit(assertions + writes)                                  │
//! │          ├── Ok           ──► return Ok(body's value)                   │
//! │          ├── Conflict     ──► sleep(backoff + jitter), retry            │
//! │          └── other error  ──► return Err    (not retryable)             │
//! │  }  until max_attempts                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The body runs again from scratch on every retry and must therefore be
//! free of side effects outside the transaction; all state it needs comes
//! from its reads.
//!
//! Backoff doubles per attempt (capped) with ±25% jitter so two registers
//! that collided once don't collide again in lockstep.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult, TxnError};
use crate::path::DocumentPath;
use crate::store::{CommitSet, DocumentStore, DocumentWrite, ReadAssertion};

// =============================================================================
// Retry Config
// =============================================================================

/// Conflict retry tuning for [`TransactionRunner`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first. `1` disables retry.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub base_delay: Duration,

    /// Ceiling on any single delay.
    pub max_delay: Duration,

    /// Multiplier applied to the delay per attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    /// Five attempts over roughly half a second: conflicts between a
    /// handful of registers clear in one or two retries, and an order
    /// submission should fail fast rather than hang.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(15),
            max_delay: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// One attempt's read-and-write buffer.
///
/// Reads go to the store and record a [`ReadAssertion`] for the version
/// they saw (or its absence). Writes stay buffered until the runner
/// commits. Reading a path this transaction already wrote returns the
/// buffered value.
pub struct Transaction<'s> {
    store: &'s dyn DocumentStore,
    assertions: Vec<ReadAssertion>,
    writes: Vec<DocumentWrite>,
}

impl<'s> Transaction<'s> {
    fn new(store: &'s dyn DocumentStore) -> Transaction<'s> {
        Transaction {
            store,
            assertions: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Reads and decodes a document, recording the version assertion.
    ///
    /// Returns `Ok(None)` for an absent document; absence is asserted
    /// too, so a concurrent create still conflicts this transaction.
    pub async fn read<T: DeserializeOwned>(
        &mut self,
        path: &DocumentPath,
    ) -> StoreResult<Option<T>> {
        if let Some(write) = self.writes.iter().find(|w| &w.path == path) {
            return Ok(Some(serde_json::from_value(write.value.clone())?));
        }

        let mut docs = self.store.snapshot(std::slice::from_ref(path)).await?;
        let doc = docs.pop().flatten();

        // First read of a path pins its version; later reads don't loosen it.
        if !self.assertions.iter().any(|a| &a.path == path) {
            self.assertions.push(ReadAssertion {
                path: path.clone(),
                version: doc.as_ref().map(|d| d.version),
            });
        }

        match doc {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Buffers a full-document write.
    pub fn write<T: Serialize>(&mut self, path: &DocumentPath, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        match self.writes.iter_mut().find(|w| &w.path == path) {
            Some(existing) => existing.value = value,
            None => self.writes.push(DocumentWrite {
                path: path.clone(),
                value,
            }),
        }
        Ok(())
    }

    fn into_commit_set(self) -> CommitSet {
        CommitSet {
            assertions: self.assertions,
            writes: self.writes,
        }
    }
}

/// Boxed future returned by a transaction body.
pub type TxnFuture<'t, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 't>>;

// =============================================================================
// Transaction Runner
// =============================================================================

/// Runs transaction bodies against a store, retrying version conflicts.
#[derive(Debug, Clone, Default)]
pub struct TransactionRunner {
    retry: RetryConfig,
}

impl TransactionRunner {
    pub fn new(retry: RetryConfig) -> TransactionRunner {
        TransactionRunner { retry }
    }

    /// Runs `body` atomically: all of its writes land together or not at
    /// all, and only if every document it read is unchanged at commit.
    ///
    /// `body` may fail with a domain error `E`; that aborts the attempt
    /// with nothing committed and no retry. Version conflicts at commit
    /// retry with backoff until [`RetryConfig::max_attempts`], then
    /// surface as `TxnError::Conflict` converted into `E`.
    pub async fn run_atomic<'s, T, E, F>(
        &self,
        store: &'s dyn DocumentStore,
        body: F,
    ) -> Result<T, E>
    where
        E: From<TxnError>,
        F: for<'t> Fn(&'t mut Transaction<'s>) -> TxnFuture<'t, T, E>,
    {
        let mut attempt: u32 = 1;
        loop {
            let mut tx = Transaction::new(store);
            let out = body(&mut tx).await?;

            match store.commit(tx.into_commit_set()).await {
                Ok(()) => return Ok(out),
                Err(StoreError::Conflict { path }) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(attempts = attempt, %path, "transaction retries exhausted");
                        return Err(TxnError::Conflict { attempts: attempt }.into());
                    }
                    let delay = self.delay_for(attempt);
                    debug!(attempt, %path, ?delay, "commit conflict, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(other) => return Err(TxnError::Store(other).into()),
            }
        }
    }

    /// Exponential backoff with ±25% jitter, capped at `max_delay`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.retry.base_delay.as_millis() as f64;
        let max_ms = self.retry.max_delay.as_millis() as f64;
        let exponential = base_ms
            * self
                .retry
                .backoff_multiplier
                .powi(attempt.saturating_sub(1) as i32);
        let capped = exponential.min(max_ms);
        let jittered = capped * (0.75 + rand::rng().random::<f64>() * 0.5);
        Duration::from_millis(jittered.min(max_ms) as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
