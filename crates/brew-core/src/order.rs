//! # Order Types
//!
//! A submitted order, its lines, and the short human-readable reference
//! printed on receipts.
//!
//! Orders are immutable once assembled: the fulfillment pipeline reads them,
//! never edits them. Monetary amounts are plain f64; this system records
//! prices as entered at the register and performs no currency arithmetic
//! beyond sum/subtract, matching how the revenue documents store them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// How the customer paid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// Drink temperature choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Temperature {
    Hot,
    Iced,
}

/// Where the order is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Consumption {
    DineIn,
    TakeAway,
}

// =============================================================================
// Customer Reference
// =============================================================================

/// Lightweight pointer to the customer attached to an order.
///
/// The full customer document lives in the store; the order only carries
/// enough to display a name and find the document again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerRef {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Order Item
// =============================================================================

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    /// Menu item this line sells; key into the recipe catalog.
    pub menu_item_id: String,

    /// Display name shown on the receipt.
    pub name: String,

    /// Number of drinks on this line. Validation guarantees ≥ 1.
    pub quantity: u32,

    /// Unit price as entered at the register.
    pub price: f64,

    pub temperature: Temperature,

    pub consumption: Consumption,

    /// Free-form barista note ("oat milk", "extra hot").
    pub note: Option<String>,
}

impl OrderItem {
    /// Line total: `price × quantity`.
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

// =============================================================================
// Order
// =============================================================================

/// A candidate or committed order.
///
/// Invariants (enforced by validation before assembly):
/// - `items` is non-empty
/// - `subtotal` is the sum of all line totals
/// - `total == subtotal − discount`, with `0 ≤ discount ≤ subtotal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// Unique identifier (UUID v4). Doubles as the document id.
    pub id: String,

    pub items: Vec<OrderItem>,

    pub subtotal: f64,

    pub discount: f64,

    pub total: f64,

    pub payment_method: PaymentMethod,

    /// Attached customer, if the drink was rung up against a member.
    pub customer: Option<CustomerRef>,

    /// Submission time, recorded in UTC. Revenue keying re-expresses this
    /// in the shop's local day.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Assembles an order from validated parts, computing the totals.
    ///
    /// Callers run [`validate_order`] first; this constructor does not
    /// re-check, it just does the arithmetic and assigns a fresh id.
    ///
    /// [`validate_order`]: crate::validation::validate_order
    pub fn assemble(
        items: Vec<OrderItem>,
        discount: f64,
        payment_method: PaymentMethod,
        customer: Option<CustomerRef>,
        created_at: DateTime<Utc>,
    ) -> Order {
        let subtotal: f64 = items.iter().map(OrderItem::line_total).sum();
        Order {
            id: Uuid::new_v4().to_string(),
            items,
            subtotal,
            discount,
            total: subtotal - discount,
            payment_method,
            customer,
            created_at,
        }
    }

    /// Total number of drinks across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

// =============================================================================
// Order Reference
// =============================================================================

/// Builds the short reference printed on receipts: `YYYYMMDD-SS-NNNN`.
///
/// - `YYYYMMDD`: the shop-local submission date
/// - `SS`: last two characters of the shop id, uppercased
/// - `NNNN`: stable hash of the order id, so a reprint carries the same
///   reference as the original
///
/// Collisions within a day are possible but harmless: the reference is a
/// human lookup aid, not a key. The order id stays the real identifier.
pub fn order_reference(order_id: &str, shop_id: &str, local_date: NaiveDate) -> String {
    let date_part = local_date.format("%Y%m%d");

    let tail: Vec<char> = shop_id.chars().rev().take(2).collect();
    let shop_part: String = if tail.is_empty() {
        "XX".to_string()
    } else {
        tail.into_iter().rev().collect::<String>().to_uppercase()
    };

    let suffix = order_id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
        % 10_000;

    format!("{date_part}-{shop_part}-{suffix:04}")
}

// =============================================================================
// Unit Tests
// =============================================================================
