//! # Engine Error Types
//!
//! What each stage of the fulfillment pipeline can fail with, and the
//! single [`SubmitError`] the caller of `submit_order` sees.
//!
//! ## Failure Asymmetry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Building / Reserving fail  ──►  nothing committed, cart intact         │
//! │                                                                         │
//! │  Persisting / Aggregating /                                             │
//! │  Accruing fail              ──►  earlier writes stay committed,         │
//! │                                  reported as Persistence{stage}         │
//! │                                  (no rollback, no compensation)         │
//! │                                                                         │
//! │  Printing fail              ──►  never an error to the caller,          │
//! │                                  downgraded to an info notice           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `TransientConflict` is reserved for the reservation stage, where nothing
//! has been written yet and re-running the whole submission is safe. A
//! conflict that exhausts retries after the reservation committed surfaces
//! as `Persistence{stage}` instead: the caller must not resubmit, the
//! ingredients are already consumed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use brew_core::ValidationError;
use brew_store::{StoreError, TxnError};

// =============================================================================
// Submission Stage
// =============================================================================

/// The pipeline stage a submission is in, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    /// Validating the cart and assembling the order.
    Building,
    /// Atomic ingredient check-and-decrement.
    Reserving,
    /// Writing the order document.
    Persisting,
    /// Folding the order into the shop-day revenue record.
    Aggregating,
    /// Crediting loyalty points.
    Accruing,
    /// Receipt handed to the print spooler.
    Printing,
    /// Cart cleared, submission done.
    Cleared,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStage::Building => write!(f, "building"),
            SubmissionStage::Reserving => write!(f, "reserving"),
            SubmissionStage::Persisting => write!(f, "persisting"),
            SubmissionStage::Aggregating => write!(f, "aggregating"),
            SubmissionStage::Accruing => write!(f, "accruing"),
            SubmissionStage::Printing => write!(f, "printing"),
            SubmissionStage::Cleared => write!(f, "cleared"),
        }
    }
}

// =============================================================================
// Reservation Error
// =============================================================================

/// Why a reservation aborted. In every case no ledger entry was written.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// An ingredient cannot cover the consolidated requirement. Amounts
    /// are in the ledger's own unit.
    #[error("Insufficient stock for {ingredient}: available {available}, requested {requested}")]
    InsufficientStock {
        ingredient: String,
        available: f64,
        requested: f64,
    },

    /// A requirement's unit cannot reach the ledger's unit and the policy
    /// is [`UnitMismatchPolicy::FailOrder`].
    ///
    /// [`UnitMismatchPolicy::FailOrder`]: brew_core::UnitMismatchPolicy::FailOrder
    #[error("Recipe measures {ingredient} in a unit the ledger cannot accept")]
    UnitMismatch { ingredient: String },

    /// A recipe references an ingredient with no ledger document. A
    /// catalog data defect, not a stock condition.
    #[error("No ledger entry for ingredient {ingredient} ({ingredient_id})")]
    UnknownIngredient {
        ingredient: String,
        ingredient_id: String,
    },

    /// The transaction layer gave up: retries exhausted on a version
    /// conflict, or a non-retryable store failure.
    #[error(transparent)]
    Txn(#[from] TxnError),
}

// Lets transaction bodies use `?` on raw store reads.
impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> ReservationError {
        ReservationError::Txn(TxnError::Store(err))
    }
}

// =============================================================================
// Printer Error
// =============================================================================

/// Receipt printing failures. Never fatal to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrinterError {
    /// No printer is attached or it stopped responding.
    #[error("Printer is not connected")]
    NotConnected,

    /// The printer refused or mangled the job.
    #[error("Printer rejected the job: {0}")]
    Rejected(String),

    /// The spooler task is no longer running, nothing will print.
    #[error("Print spooler is not running")]
    SpoolerStopped,
}

// =============================================================================
// Submit Error
// =============================================================================

/// Everything `submit_order` can fail with.
///
/// Variants up to and including [`TransientConflict`] mean nothing was
/// committed; [`Persistence`] means earlier stages' writes remain.
///
/// [`TransientConflict`]: SubmitError::TransientConflict
/// [`Persistence`]: SubmitError::Persistence
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The cart failed validation; rejected before any store access.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reservation aborted: an ingredient cannot cover the order.
    #[error("Insufficient stock for {ingredient}")]
    InsufficientStock { ingredient: String },

    /// Reservation aborted under the strict unit-mismatch policy.
    #[error("Recipe measures {ingredient} in a unit the ledger cannot accept")]
    UnitMismatch { ingredient: String },

    /// Reservation aborted: a recipe references an unknown ingredient.
    #[error("No ledger entry for ingredient {ingredient}")]
    UnknownIngredient { ingredient: String },

    /// Reservation retries exhausted with nothing written. Re-running the
    /// whole submission is safe.
    #[error("Registers are busy, submission gave up after {attempts} attempts")]
    TransientConflict { attempts: u32 },

    /// A post-reservation write failed. Earlier stages stay committed;
    /// do not resubmit.
    #[error("Order {stage} step failed: {source}")]
    Persistence {
        stage: SubmissionStage,
        #[source]
        source: TxnError,
    },

    /// Fallback for failures no other variant describes; always logged.
    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

impl SubmitError {
    pub(crate) fn persistence(stage: SubmissionStage, source: impl Into<TxnError>) -> SubmitError {
        SubmitError::Persistence {
            stage,
            source: source.into(),
        }
    }
}

impl From<ReservationError> for SubmitError {
    fn from(err: ReservationError) -> SubmitError {
        match err {
            ReservationError::InsufficientStock { ingredient, .. } => {
                SubmitError::InsufficientStock { ingredient }
            }
            ReservationError::UnitMismatch { ingredient } => {
                SubmitError::UnitMismatch { ingredient }
            }
            ReservationError::UnknownIngredient { ingredient, .. } => {
                SubmitError::UnknownIngredient { ingredient }
            }
            // Conflict exhaustion during reservation commits nothing, so
            // the caller may retry the whole submission.
            ReservationError::Txn(TxnError::Conflict { attempts }) => {
                SubmitError::TransientConflict { attempts }
            }
            ReservationError::Txn(err) => {
                SubmitError::persistence(SubmissionStage::Reserving, err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
