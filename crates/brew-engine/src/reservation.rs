//! # Reservation Engine
//!
//! Atomic ingredient check-and-decrement for one order.
//!
//! ## Reservation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reserve(ctx, order, catalog)                                           │
//! │                                                                         │
//! │  1. consolidate_requirements (pure, brew-core)                          │
//! │        order lines × recipes ──► one requirement per ingredient         │
//! │                                                                         │
//! │  2. run_atomic transaction                                              │
//! │        for each requirement (ordered by ingredient id):                 │
//! │            read ledger entry        ── absent? ──► UnknownIngredient    │
//! │            convert to ledger unit   ── fails?  ──► policy: skip / fail  │
//! │            consume(needed)          ── short?  ──► InsufficientStock,   │
//! │            collect low-stock alert                 whole txn aborts     │
//! │            buffer write                                                 │
//! │        commit: every read version unchanged, or retry                   │
//! │                                                                         │
//! │  3. success ──► Vec<LowStockAlert> for the caller to surface            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All-or-nothing: one short ingredient aborts the transaction before any
//! buffered write reaches the store, including entries already found
//! sufficient. Alerts are computed against the post-consume state inside
//! the body but only handed out after the commit succeeds.
//!
//! Requirements are walked in ingredient-id order (the consolidation
//! guarantees it), so two registers reserving overlapping ingredients
//! conflict cleanly instead of interleaving.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use brew_core::{
    consolidate_requirements, CoreError, IngredientUsage, LowStockAlert, Order,
    UnitMismatchPolicy,
};
use brew_store::{DocumentStore, TransactionRunner};

use crate::catalog::MenuCatalog;
use crate::config::{EngineConfig, ShopContext};
use crate::error::ReservationError;
use crate::paths;

/// Reserves ingredient stock for orders, one atomic transaction per order.
pub struct ReservationEngine {
    store: Arc<dyn DocumentStore>,
    runner: TransactionRunner,
    policy: UnitMismatchPolicy,
    warn_factor: f64,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> ReservationEngine {
        ReservationEngine {
            store,
            runner: TransactionRunner::new(config.retry.clone()),
            policy: config.unit_mismatch_policy,
            warn_factor: config.low_stock_warn_factor,
        }
    }

    /// Atomically consumes every ingredient the order needs.
    ///
    /// On success the ledger writes are committed and the returned alerts
    /// describe every touched ingredient now at or below its low-stock
    /// threshold. On any error nothing was written.
    pub async fn reserve(
        &self,
        ctx: &ShopContext,
        order: &Order,
        catalog: &dyn MenuCatalog,
    ) -> Result<Vec<LowStockAlert>, ReservationError> {
        let outcome =
            consolidate_requirements(order, |id| catalog.recipes_for(id), self.policy).map_err(
                |err| match err {
                    // Consolidation only fails on a unit mismatch.
                    CoreError::RecipeUnitMismatch { ingredient, .. } => {
                        ReservationError::UnitMismatch { ingredient }
                    }
                    other => ReservationError::UnitMismatch {
                        ingredient: other.to_string(),
                    },
                },
            )?;

        for skip in &outcome.skipped {
            warn!(
                menu_item = %skip.menu_item_id,
                ingredient = %skip.ingredient_name,
                line_unit = ?skip.line_unit,
                group_unit = ?skip.group_unit,
                "Recipe line skipped: unit mismatch"
            );
        }

        if outcome.requirements.is_empty() {
            debug!(order_id = %order.id, "Order consumes no tracked ingredients");
            return Ok(Vec::new());
        }

        let ingredient_count = outcome.requirements.len();
        let requirements = Arc::new(outcome.requirements);
        let collection = paths::ingredients(&ctx.shop_id);
        let policy = self.policy;
        let warn_factor = self.warn_factor;

        let alerts: Vec<LowStockAlert> = self
            .runner
            .run_atomic(self.store.as_ref(), move |tx| {
                let requirements = Arc::clone(&requirements);
                let collection = collection.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let mut alerts = Vec::new();

                    for required in requirements.iter() {
                        let path = collection.doc(&required.ingredient_id);
                        let Some(mut entry) = tx.read::<IngredientUsage>(&path).await? else {
                            return Err(ReservationError::UnknownIngredient {
                                ingredient: required.ingredient_name.clone(),
                                ingredient_id: required.ingredient_id.clone(),
                            });
                        };

                        // The consolidated amount is in the recipe's base
                        // unit; a ledger counted in another quantity kind
                        // still cannot accept it.
                        let needed =
                            match required.amount.converted(entry.measurement_per_unit.unit) {
                                Ok(needed) => needed,
                                Err(_) => match policy {
                                    UnitMismatchPolicy::SkipLine => {
                                        warn!(
                                            ingredient = %entry.name,
                                            requirement_unit = ?required.amount.unit,
                                            ledger_unit = ?entry.measurement_per_unit.unit,
                                            "Requirement skipped: unit cannot reach ledger"
                                        );
                                        continue;
                                    }
                                    UnitMismatchPolicy::FailOrder => {
                                        return Err(ReservationError::UnitMismatch {
                                            ingredient: entry.name,
                                        });
                                    }
                                },
                            };

                        if let Err(err) = entry.consume(&needed, now) {
                            return Err(match err {
                                CoreError::InsufficientStock {
                                    ingredient,
                                    available,
                                    requested,
                                } => {
                                    info!(
                                        ingredient = %ingredient,
                                        available,
                                        requested,
                                        "Insufficient stock, reservation aborts"
                                    );
                                    ReservationError::InsufficientStock {
                                        ingredient,
                                        available,
                                        requested,
                                    }
                                }
                                // `needed` is already in the ledger's unit,
                                // so what remains is a unit problem.
                                _ => ReservationError::UnitMismatch {
                                    ingredient: entry.name.clone(),
                                },
                            });
                        }

                        if let Some(alert) = entry.low_stock_alert(warn_factor) {
                            alerts.push(alert);
                        }
                        tx.write(&path, &entry)?;
                    }

                    Ok(alerts)
                })
            })
            .await?;

        info!(
            shop_id = %ctx.shop_id,
            order_id = %order.id,
            ingredients = ingredient_count,
            alerts = alerts.len(),
            "Reservation committed"
        );
        Ok(alerts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
