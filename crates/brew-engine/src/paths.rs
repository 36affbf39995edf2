//! # Document Layout
//!
//! Every document the engine touches lives under one shop:
//!
//! ```text
//! shops/{shopId}/ingredients/{ingredientId}   IngredientUsage ledger entry
//! shops/{shopId}/orders/{orderId}             committed Order
//! shops/{shopId}/revenue/{YYYY-MM-DD}         RevenueRecord, one per local day
//! shops/{shopId}/customers/{customerId}       Customer loyalty document
//! ```
//!
//! Revenue documents are keyed by the ISO date itself, so a listing of the
//! collection comes back in chronological order for free.

use brew_store::CollectionPath;
use chrono::NaiveDate;

/// Ledger entries for one shop.
pub fn ingredients(shop_id: &str) -> CollectionPath {
    CollectionPath::new(format!("shops/{shop_id}/ingredients"))
}

/// Committed orders for one shop.
pub fn orders(shop_id: &str) -> CollectionPath {
    CollectionPath::new(format!("shops/{shop_id}/orders"))
}

/// Daily revenue records for one shop.
pub fn revenue(shop_id: &str) -> CollectionPath {
    CollectionPath::new(format!("shops/{shop_id}/revenue"))
}

/// Loyalty customer documents for one shop.
pub fn customers(shop_id: &str) -> CollectionPath {
    CollectionPath::new(format!("shops/{shop_id}/customers"))
}

/// Document id for a shop-local revenue day: `YYYY-MM-DD`.
pub fn revenue_day_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
