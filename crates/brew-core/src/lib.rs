//! # brew-core
//!
//! Pure business logic for Brew POS: unit-aware measurements, the
//! ingredient ledger, orders, revenue rollups and loyalty members.
//!
//! ## Design Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    brew-core = Pure Functions + Types                   │
//! │                                                                         │
//! │   Input ──────► [ brew-core logic ] ──────► Output                      │
//! │                                                                         │
//! │   No document store. No network. No printer. No clock lookups.          │
//! │   Same input = same output, every time.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The document store, transactions and the fulfillment pipeline live in
//! `brew-store` and `brew-engine`; both depend on this crate, never the
//! other way around.
//!
//! ## Module Overview
//! | Module         | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | `measurement`  | Unit-aware quantities (g/kg/ml/l/pc)                 |
//! | `ledger`       | Ingredient stock entries and availability math       |
//! | `order`        | Orders, lines, payment methods, order references     |
//! | `customer`     | Loyalty members and point balances                   |
//! | `revenue`      | Per-shop-per-day statistics rollup                   |
//! | `requirements` | Recipe consolidation across order lines              |
//! | `validation`   | Pre-submission input checks                          |
//! | `error`        | `CoreError` / `ValidationError`                      |

pub mod customer;
pub mod error;
pub mod ledger;
pub mod measurement;
pub mod order;
pub mod requirements;
pub mod revenue;
pub mod validation;

// Re-export the types most callers need, so `use brew_core::Order` works
// without knowing the module layout.
pub use customer::Customer;
pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use ledger::{IngredientUsage, LowStockAlert, StockStatus};
pub use measurement::{Measurement, MeasurementUnit, QuantityKind};
pub use order::{
    order_reference, Consumption, CustomerRef, Order, OrderItem, PaymentMethod, Temperature,
};
pub use requirements::{
    consolidate_requirements, ConsolidationOutcome, Recipe, RequiredIngredient, SkippedLine,
    UnitMismatchPolicy,
};
pub use revenue::{shop_local_parts, RevenueRecord};
pub use validation::validate_order;

// =============================================================================
// Business Constants
// =============================================================================

/// Default loyalty accrual rate: points earned per currency unit spent.
///
/// ## Why 0.05?
/// One point per 20 spent. Shops can override the rate per shop; this is
/// only the fallback when the shop document carries none.
pub const DEFAULT_POINT_RATE: f64 = 0.05;

/// Low-stock warning factor applied to an ingredient's reorder threshold.
///
/// ## Why 1.2?
/// Alerts fire at 120% of the minimum so the warning lands while there is
/// still stock to sell, not at the moment the shelf is already empty.
pub const LOW_STOCK_WARN_FACTOR: f64 = 1.2;

/// Maximum number of lines in one order.
///
/// ## Why 100?
/// A register order beyond 100 distinct lines is a data-entry accident.
/// Catching it at validation keeps a runaway cart from turning into a
/// 100-document reservation.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity on a single order line.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Tolerance for comparing derived monetary values.
///
/// Rollup figures are f64; after a day of merges `averageOrderValue` and
/// `revenue / totalOrders` agree to well within this bound.
pub const FLOAT_TOLERANCE: f64 = 1e-6;
