//! # Ingredient Ledger
//!
//! Per-shop stock tracking for recipe ingredients.
//!
//! ## The Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  IngredientUsage "Milk"                                                 │
//! │                                                                         │
//! │  quantity            = 10        (storage units, e.g. bottles)          │
//! │  measurementPerUnit  = 1 l       (content of one storage unit)          │
//! │  used                = 3.2       (cumulative, in l)                     │
//! │                                                                         │
//! │  totalMeasurement    = 10 × 1    = 10 l     (derived)                   │
//! │  available           = 10 − 3.2  = 6.8 l    (derived)                   │
//! │                                                                         │
//! │  minQuantity = 2  →  minimum measurement 2 l                            │
//! │  stock status: quantity == 0          → out_of_stock                    │
//! │                totalMeasurement ≤ 2 l → low_stock                       │
//! │                otherwise              → in_stock                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reservation never edits `quantity` (restocking does that); it only grows
//! `used`. Both derived figures fall out of those two fields, so the ledger
//! document stays small and conflict-checkable.
//!
//! Stock status tracks the procurement side: how many storage units the shop
//! bought, against the reorder threshold. A heavily consumed ledger can
//! still read in_stock until restocking edits `quantity`; the consumption
//! side is watched by [`IngredientUsage::low_stock_alert`], which looks at
//! `available` instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::measurement::Measurement;

// =============================================================================
// Stock Status
// =============================================================================

/// Coarse stock level derived from a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

// =============================================================================
// Ingredient Usage
// =============================================================================

/// One ingredient's ledger entry.
///
/// Stored as a document per ingredient per shop. `used` accumulates across
/// orders and is the only field reservation writes (plus `updatedAt`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IngredientUsage {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in alerts and error messages.
    pub name: String,

    /// Stock on hand, counted in storage units (bottles, bags, sleeves).
    pub quantity: f64,

    /// Content of one storage unit, e.g. `1 l` per bottle.
    pub measurement_per_unit: Measurement,

    /// Cumulative consumed amount, in `measurement_per_unit`'s unit.
    pub used: f64,

    /// Reorder threshold, in storage units.
    pub min_quantity: f64,

    /// Purchase cost of one storage unit.
    pub cost_price: f64,

    /// When the ledger entry was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the ledger entry was last written.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl IngredientUsage {
    /// Total stocked amount: `quantity × measurementPerUnit`.
    pub fn total_measurement(&self) -> Measurement {
        self.measurement_per_unit.multiplied(self.quantity)
    }

    /// Remaining amount: `totalMeasurement − used`, floored at zero.
    pub fn available(&self) -> Measurement {
        Measurement::new(
            self.total_measurement().value - self.used,
            self.measurement_per_unit.unit,
        )
    }

    /// Reorder threshold expressed as a measurement:
    /// `minQuantity × measurementPerUnit`.
    pub fn min_measurement(&self) -> Measurement {
        self.measurement_per_unit.multiplied(self.min_quantity)
    }

    /// Derives the coarse stock level from the procurement-side fields:
    /// no storage units at all is out of stock, a stocked total at or
    /// below the reorder threshold is low.
    pub fn stock_status(&self) -> StockStatus {
        if self.quantity == 0.0 {
            StockStatus::OutOfStock
        } else if self.total_measurement().value <= self.min_measurement().value {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Whether the ledger can cover `amount` without going negative.
    ///
    /// `amount` may be in any unit compatible with the ledger's unit.
    pub fn can_supply(&self, amount: &Measurement) -> CoreResult<bool> {
        let needed = amount.converted(self.measurement_per_unit.unit)?;
        Ok(self.available().value >= needed.value)
    }

    /// Consumes `amount` from the ledger, growing `used`.
    ///
    /// Fails with [`CoreError::InsufficientStock`] when the remaining
    /// amount cannot cover the request, and with
    /// [`CoreError::IncompatibleUnits`] when the units cannot meet.
    /// On success `updated_at` is set to `at`.
    pub fn consume(&mut self, amount: &Measurement, at: DateTime<Utc>) -> CoreResult<()> {
        let needed = amount.converted(self.measurement_per_unit.unit)?;
        let available = self.available();
        if needed.value > available.value {
            return Err(CoreError::InsufficientStock {
                ingredient: self.name.clone(),
                available: available.value,
                requested: needed.value,
            });
        }
        self.used += needed.value;
        self.updated_at = at;
        Ok(())
    }

    /// Builds a low-stock alert if the remaining amount has fallen to or
    /// below `warn_factor ×` the reorder threshold.
    ///
    /// With the default factor of 1.2 the alert fires a little before the
    /// ledger is formally low, giving the shop time to reorder.
    pub fn low_stock_alert(&self, warn_factor: f64) -> Option<LowStockAlert> {
        let available = self.available();
        let min = self.min_measurement();
        if available.value <= min.value * warn_factor {
            Some(LowStockAlert {
                ingredient_name: self.name.clone(),
                current_available: available.value,
                min_quantity: self.min_quantity,
                percentage: if min.value > 0.0 {
                    (available.value / min.value) * 100.0
                } else {
                    0.0
                },
            })
        } else {
            None
        }
    }
}

// =============================================================================
// Low Stock Alert
// =============================================================================

/// Warning surfaced to the register after a successful reservation.
///
/// Informational only: alerts never block an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LowStockAlert {
    pub ingredient_name: String,

    /// Remaining amount, in the ledger's unit.
    pub current_available: f64,

    /// Reorder threshold, in storage units.
    pub min_quantity: f64,

    /// Remaining amount as a percentage of the reorder threshold.
    pub percentage: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::MeasurementUnit;

    fn milk_ledger() -> IngredientUsage {
        IngredientUsage {
            id: "ing-milk".to_string(),
            name: "Milk".to_string(),
            quantity: 10.0,
            measurement_per_unit: Measurement::liters(1.0),
            used: 3.2,
            min_quantity: 2.0,
            cost_price: 1.8,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_derived_totals() {
        let milk = milk_ledger();
        assert_eq!(milk.total_measurement().value, 10.0);
        assert_eq!(milk.total_measurement().unit, MeasurementUnit::Liter);
        assert!((milk.available().value - 6.8).abs() < 1e-9);
    }

    #[test]
    fn test_stock_status_thresholds() {
        let mut milk = milk_ledger();
        assert_eq!(milk.stock_status(), StockStatus::InStock);

        milk.quantity = 2.0; // total 2 l == threshold 2 l
        assert_eq!(milk.stock_status(), StockStatus::LowStock);

        milk.quantity = 0.0;
        assert_eq!(milk.stock_status(), StockStatus::OutOfStock);
    }

    #[test]
    fn test_stock_status_ignores_consumption() {
        let mut milk = milk_ledger();
        milk.used = 10.0; // fully consumed, but 10 bottles were bought
        assert_eq!(milk.stock_status(), StockStatus::InStock);
    }

    #[test]
    fn test_can_supply_converts_units() {
        let milk = milk_ledger();
        // 6.8 l available; 500 ml fits, 7 l does not.
        assert!(milk.can_supply(&Measurement::milliliters(500.0)).unwrap());
        assert!(!milk.can_supply(&Measurement::liters(7.0)).unwrap());
    }

    #[test]
    fn test_can_supply_rejects_incompatible_unit() {
        let milk = milk_ledger();
        assert!(milk.can_supply(&Measurement::pieces(1.0)).is_err());
    }

    #[test]
    fn test_consume_grows_used_and_touches_timestamp() {
        let mut milk = milk_ledger();
        let before = milk.updated_at;
        let at = before + chrono::Duration::seconds(5);

        milk.consume(&Measurement::milliliters(500.0), at).unwrap();

        assert!((milk.used - 3.7).abs() < 1e-9);
        assert_eq!(milk.updated_at, at);
    }

    #[test]
    fn test_consume_insufficient_leaves_ledger_untouched() {
        let mut milk = milk_ledger();
        let err = milk
            .consume(&Measurement::liters(7.0), Utc::now())
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock { ref ingredient, .. } if ingredient == "Milk"
        ));
        assert!((milk.used - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_low_stock_alert_fires_within_warn_band() {
        let mut milk = milk_ledger();
        // available 6.8 l vs threshold 2 l × 1.2 = 2.4 l: no alert yet.
        assert!(milk.low_stock_alert(1.2).is_none());

        milk.used = 7.8; // available 2.2 l <= 2.4 l
        let alert = milk.low_stock_alert(1.2).unwrap();
        assert_eq!(alert.ingredient_name, "Milk");
        assert!((alert.current_available - 2.2).abs() < 1e-9);
        assert!((alert.percentage - 110.0).abs() < 1e-6);
    }

    #[test]
    fn test_low_stock_alert_handles_zero_threshold() {
        let mut milk = milk_ledger();
        milk.min_quantity = 0.0;
        milk.used = 10.0; // available 0 <= 0
        let alert = milk.low_stock_alert(1.2).unwrap();
        assert_eq!(alert.percentage, 0.0);
    }
}
