//! # Requirement Consolidation
//!
//! Flattens an order's recipe lines into one requirement per ingredient.
//!
//! ```text
//! Order                         Recipes                    Requirements
//! ─────────────────────────     ──────────────────────     ─────────────────
//! 2 × Latte            ──────►  18 g beans, 250 ml milk    beans:  56 g
//! 1 × Flat White       ──────►  20 g beans, 160 ml milk    milk:  660 ml
//! ```
//!
//! Consolidation is pure: it never touches the ledger. Requirements come out
//! normalized to each ingredient's base unit (g / ml / pc); the reservation
//! step converts them into each ledger entry's own unit when it reads the
//! entry.
//!
//! A recipe line whose unit cannot combine with the ingredient's running
//! total (someone entered "2 pc lemon" against a grams-based group) is
//! handled per [`UnitMismatchPolicy`]: skipped and reported back for
//! logging, or fatal for the whole order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::measurement::{Measurement, MeasurementUnit};
use crate::order::Order;

// =============================================================================
// Recipe
// =============================================================================

/// One ingredient draw for one unit of a menu item.
///
/// A menu item carries a list of these; selling `n` of the item multiplies
/// every `required_amount` by `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Recipe {
    /// Ledger entry this recipe draws from.
    pub ingredient_id: String,

    /// Display name, carried for error messages and alerts.
    pub ingredient_name: String,

    /// Amount consumed per unit sold.
    pub required_amount: Measurement,
}

// =============================================================================
// Unit Mismatch Policy
// =============================================================================

/// What to do when a recipe line's unit cannot reach the required unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMismatchPolicy {
    /// Drop the offending line and keep going. The skip is surfaced to the
    /// caller so it lands in the log, never silently.
    #[default]
    SkipLine,

    /// Abort the whole order. Stricter shops prefer a loud failure over a
    /// drink that quietly consumed no stock.
    FailOrder,
}

// =============================================================================
// Consolidation Output
// =============================================================================

/// One ingredient's total draw for an order, normalized to its kind's base
/// unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredIngredient {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub amount: Measurement,
}

/// A recipe line dropped under [`UnitMismatchPolicy::SkipLine`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub menu_item_id: String,
    pub ingredient_name: String,
    pub line_unit: MeasurementUnit,
    pub group_unit: MeasurementUnit,
}

/// Result of consolidating an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidationOutcome {
    /// One entry per distinct ingredient, ordered by ingredient id.
    pub requirements: Vec<RequiredIngredient>,

    /// Lines dropped because their unit could not combine. Empty under
    /// [`UnitMismatchPolicy::FailOrder`] (the order would have failed).
    pub skipped: Vec<SkippedLine>,
}

// =============================================================================
// Consolidation
// =============================================================================

/// Consolidates an order's recipe draws into per-ingredient requirements.
///
/// `recipes_for` resolves a menu item id to its recipe list; items the
/// catalog does not know simply contribute nothing (plenty of menu items
/// have no tracked ingredients at all).
///
/// The output is keyed and ordered by `ingredient_id`, so downstream ledger
/// reads always happen in the same order regardless of how the cart was
/// built.
pub fn consolidate_requirements<'a, F>(
    order: &Order,
    mut recipes_for: F,
    policy: UnitMismatchPolicy,
) -> CoreResult<ConsolidationOutcome>
where
    F: FnMut(&str) -> Option<&'a [Recipe]>,
{
    let mut totals: BTreeMap<String, RequiredIngredient> = BTreeMap::new();
    let mut skipped = Vec::new();

    for item in &order.items {
        let Some(recipes) = recipes_for(&item.menu_item_id) else {
            continue;
        };

        for recipe in recipes {
            let line_amount = recipe.required_amount.multiplied(f64::from(item.quantity));

            match totals.get_mut(&recipe.ingredient_id) {
                None => {
                    totals.insert(
                        recipe.ingredient_id.clone(),
                        RequiredIngredient {
                            ingredient_id: recipe.ingredient_id.clone(),
                            ingredient_name: recipe.ingredient_name.clone(),
                            amount: line_amount.in_base_unit(),
                        },
                    );
                }
                Some(required) => match required.amount.adding(&line_amount) {
                    Ok(sum) => required.amount = sum,
                    Err(_) => match policy {
                        UnitMismatchPolicy::SkipLine => skipped.push(SkippedLine {
                            menu_item_id: item.menu_item_id.clone(),
                            ingredient_name: recipe.ingredient_name.clone(),
                            line_unit: recipe.required_amount.unit,
                            group_unit: required.amount.unit,
                        }),
                        UnitMismatchPolicy::FailOrder => {
                            return Err(CoreError::RecipeUnitMismatch {
                                menu_item: item.menu_item_id.clone(),
                                ingredient: recipe.ingredient_name.clone(),
                            })
                        }
                    },
                },
            }
        }
    }

    Ok(ConsolidationOutcome {
        requirements: totals.into_values().collect(),
        skipped,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Consumption, OrderItem, PaymentMethod, Temperature};
    use chrono::Utc;

    fn item(menu_item_id: &str, quantity: u32) -> OrderItem {
        OrderItem {
            menu_item_id: menu_item_id.to_string(),
            name: menu_item_id.to_string(),
            quantity,
            price: 4.0,
            temperature: Temperature::Hot,
            consumption: Consumption::DineIn,
            note: None,
        }
    }

    fn order_of(items: Vec<OrderItem>) -> Order {
        Order::assemble(items, 0.0, PaymentMethod::Cash, None, Utc::now())
    }

    fn recipe(id: &str, amount: Measurement) -> Recipe {
        Recipe {
            ingredient_id: id.to_string(),
            ingredient_name: id.to_string(),
            required_amount: amount,
        }
    }

    #[test]
    fn test_multiplies_by_line_quantity() {
        let latte = vec![recipe("milk", Measurement::milliliters(300.0))];
        let order = order_of(vec![item("menu-latte", 2)]);

        let outcome = consolidate_requirements(
            &order,
            |id| (id == "menu-latte").then_some(latte.as_slice()),
            UnitMismatchPolicy::SkipLine,
        )
        .unwrap();

        assert_eq!(outcome.requirements.len(), 1);
        assert_eq!(outcome.requirements[0].amount, Measurement::milliliters(600.0));
    }

    #[test]
    fn test_sums_across_lines_with_unit_conversion() {
        let latte = vec![recipe("milk", Measurement::milliliters(500.0))];
        let batch_brew = vec![recipe("milk", Measurement::liters(1.0))];
        let order = order_of(vec![item("menu-latte", 1), item("menu-batch", 1)]);

        let outcome = consolidate_requirements(
            &order,
            |id| match id {
                "menu-latte" => Some(latte.as_slice()),
                "menu-batch" => Some(batch_brew.as_slice()),
                _ => None,
            },
            UnitMismatchPolicy::SkipLine,
        )
        .unwrap();

        // 500 ml + 1 l, normalized to the base unit.
        assert_eq!(outcome.requirements[0].amount, Measurement::milliliters(1500.0));
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_distinct_ingredients_sorted_by_id() {
        let mocha = vec![
            recipe("b-chocolate", Measurement::grams(30.0)),
            recipe("a-beans", Measurement::grams(18.0)),
        ];
        let order = order_of(vec![item("menu-mocha", 1)]);

        let outcome = consolidate_requirements(
            &order,
            |_| Some(mocha.as_slice()),
            UnitMismatchPolicy::SkipLine,
        )
        .unwrap();

        let ids: Vec<&str> = outcome
            .requirements
            .iter()
            .map(|r| r.ingredient_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a-beans", "b-chocolate"]);
    }

    #[test]
    fn test_unknown_menu_item_contributes_nothing() {
        let order = order_of(vec![item("menu-water", 3)]);
        let outcome =
            consolidate_requirements(&order, |_| None, UnitMismatchPolicy::SkipLine).unwrap();

        assert!(outcome.requirements.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_mismatched_line_is_skipped_and_reported() {
        let latte = vec![recipe("lemon", Measurement::grams(20.0))];
        let oddball = vec![recipe("lemon", Measurement::pieces(1.0))];
        let order = order_of(vec![item("menu-latte", 1), item("menu-odd", 1)]);

        let outcome = consolidate_requirements(
            &order,
            |id| match id {
                "menu-latte" => Some(latte.as_slice()),
                "menu-odd" => Some(oddball.as_slice()),
                _ => None,
            },
            UnitMismatchPolicy::SkipLine,
        )
        .unwrap();

        // The grams group survives; the piece line is dropped and reported.
        assert_eq!(outcome.requirements[0].amount, Measurement::grams(20.0));
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].ingredient_name, "lemon");
        assert_eq!(outcome.skipped[0].line_unit, MeasurementUnit::Piece);
        assert_eq!(outcome.skipped[0].group_unit, MeasurementUnit::Gram);
    }

    #[test]
    fn test_mismatched_line_fails_order_under_strict_policy() {
        let latte = vec![recipe("lemon", Measurement::grams(20.0))];
        let oddball = vec![recipe("lemon", Measurement::pieces(1.0))];
        let order = order_of(vec![item("menu-latte", 1), item("menu-odd", 1)]);

        let err = consolidate_requirements(
            &order,
            |id| match id {
                "menu-latte" => Some(latte.as_slice()),
                "menu-odd" => Some(oddball.as_slice()),
                _ => None,
            },
            UnitMismatchPolicy::FailOrder,
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::RecipeUnitMismatch { .. }));
    }
}
