//! # Engine Configuration
//!
//! Tuning knobs for the fulfillment pipeline, plus the shop context every
//! operation receives explicitly.
//!
//! ## No Ambient State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  There is no global "current shop" singleton anywhere in this crate.    │
//! │                                                                         │
//! │  UI / caller ──► ShopContext ──► submit_order(ctx, ...)                 │
//! │                        │                                                │
//! │                        ├──► reservation  (paths, logging)               │
//! │                        ├──► revenue      (local day keying)             │
//! │                        └──► loyalty      (point rate override)          │
//! │                                                                         │
//! │  Two registers serving two shops can share one engine process           │
//! │  without stepping on each other's state.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use brew_store::RetryConfig;
use serde::{Deserialize, Serialize};

use brew_core::{UnitMismatchPolicy, DEFAULT_POINT_RATE, LOW_STOCK_WARN_FACTOR};

// =============================================================================
// Engine Config
// =============================================================================

/// Fulfillment pipeline configuration.
///
/// One value per engine instance, fixed at construction. Everything here has
/// a sensible default; most deployments only ever touch
/// `unit_mismatch_policy`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Loyalty points earned per currency unit spent, unless the shop
    /// context overrides it.
    pub point_rate: f64,

    /// What to do with a recipe line whose unit cannot reach the ledger's
    /// unit: drop it with a warning (default) or fail the whole order.
    pub unit_mismatch_policy: UnitMismatchPolicy,

    /// Low-stock alerts fire when availability falls to or below
    /// `min_quantity × measurement_per_unit × this factor`.
    pub low_stock_warn_factor: f64,

    /// Conflict retry tuning for every store transaction the engine runs.
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            point_rate: DEFAULT_POINT_RATE,
            unit_mismatch_policy: UnitMismatchPolicy::default(),
            low_stock_warn_factor: LOW_STOCK_WARN_FACTOR,
            retry: RetryConfig::default(),
        }
    }
}

// =============================================================================
// Shop Context
// =============================================================================

/// The shop a submission runs against.
///
/// Passed explicitly into every engine operation; components derive their
/// document paths, local-day keys and point rates from it and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopContext {
    /// Shop identifier; the root segment of every document path.
    pub shop_id: String,

    /// Display name, printed on receipts.
    pub shop_name: String,

    /// Fixed offset from UTC in minutes (e.g. +540 for UTC+9). Revenue
    /// days and receipt references follow the shop's clock, not the
    /// server's.
    pub utc_offset_minutes: i32,

    /// Per-shop loyalty rate. `None` falls back to
    /// [`EngineConfig::point_rate`].
    pub point_rate: Option<f64>,
}

impl ShopContext {
    /// A context with no overrides, running on UTC days.
    pub fn new(shop_id: impl Into<String>, shop_name: impl Into<String>) -> ShopContext {
        ShopContext {
            shop_id: shop_id.into(),
            shop_name: shop_name.into(),
            utc_offset_minutes: 0,
            point_rate: None,
        }
    }

    /// The loyalty rate in effect: the shop's own, or the given default.
    pub fn effective_point_rate(&self, default: f64) -> f64 {
        self.point_rate.unwrap_or(default)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_core_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.point_rate, DEFAULT_POINT_RATE);
        assert_eq!(config.low_stock_warn_factor, LOW_STOCK_WARN_FACTOR);
        assert_eq!(config.unit_mismatch_policy, UnitMismatchPolicy::SkipLine);
    }

    #[test]
    fn test_point_rate_override() {
        let mut ctx = ShopContext::new("shop-17", "Corner Brew");

        assert_eq!(ctx.effective_point_rate(DEFAULT_POINT_RATE), DEFAULT_POINT_RATE);

        ctx.point_rate = Some(0.1);
        assert_eq!(ctx.effective_point_rate(DEFAULT_POINT_RATE), 0.1);
    }
}
