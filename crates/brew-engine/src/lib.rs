//! # brew-engine
//!
//! The order-fulfillment pipeline for Brew POS: ingredient reservation,
//! revenue aggregation, loyalty accrual and receipt printing, orchestrated
//! per submission over the `brew-store` document store.
//!
//! ## Pipeline Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   CartState ──► OrderOrchestrator::submit_order(ctx, request)           │
//! │                      │                                                  │
//! │                      ├─► ReservationEngine   atomic stock decrement     │
//! │                      ├─► order document      insert-new                 │
//! │                      ├─► RevenueAggregator   shop-day rollup upsert     │
//! │                      ├─► LoyaltyAccrual      member point credit        │
//! │                      └─► PrintSpooler        best-effort receipt        │
//! │                                                                         │
//! │   SubmissionEvent / Notice / PrintOutcome channels feed the UI          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//! | Module         | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | `cart`         | In-memory cart and its shared state handle           |
//! | `catalog`      | Menu-item to recipe lookup                           |
//! | `config`       | Engine tuning and per-shop context                   |
//! | `error`        | Pipeline stages and the error taxonomy               |
//! | `loyalty`      | Member registration and point accrual                |
//! | `notify`       | User-visible notices                                 |
//! | `orchestrator` | The submission state machine                         |
//! | `paths`        | Shop-scoped document path layout                     |
//! | `printing`     | Receipts and the print spooler task                  |
//! | `reservation`  | Atomic ingredient check-and-decrement                |
//! | `revenue`      | Per-shop-day statistics upserts and reads            |

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loyalty;
pub mod notify;
pub mod orchestrator;
pub mod paths;
pub mod printing;
pub mod reservation;
pub mod revenue;

// Re-export the submission surface, so wiring a terminal only needs
// `use brew_engine::...` plus the store implementation.
pub use cart::{Cart, CartItem, CartState};
pub use catalog::{MenuCatalog, StaticCatalog};
pub use config::{EngineConfig, ShopContext};
pub use error::{PrinterError, ReservationError, SubmissionStage, SubmitError};
pub use loyalty::LoyaltyAccrual;
pub use notify::{ChannelNotifier, Notice, NoticeLevel, NotificationSink};
pub use orchestrator::{
    CustomerSelection, OrderOrchestrator, SubmissionEvent, SubmissionSummary, SubmitRequest,
};
pub use printing::{
    PrintOutcome, PrintSpooler, Receipt, ReceiptLine, ReceiptPrinter, SpoolerHandle,
};
pub use reservation::ReservationEngine;
pub use revenue::RevenueAggregator;
