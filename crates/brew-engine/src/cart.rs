//! # Cart State
//!
//! The in-memory cart a register builds an order from.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Register Action          Cart Call                Cart Change          │
//! │  ───────────────          ─────────                ───────────          │
//! │                                                                         │
//! │  Tap menu item ──────────► add_item() ───────────► merge or push line   │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ────► line.quantity = n    │
//! │                                                                         │
//! │  Remove line ────────────► remove_item() ────────► items.remove(line)   │
//! │                                                                         │
//! │  Submit succeeds ────────► clear() ──────────────► items + discount     │
//! │                                                    reset                │
//! │                                                                         │
//! │  Submit aborts ──────────► (no call) ────────────► cart untouched       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines merge on `(menu item, temperature, consumption)`: a second hot
//! dine-in latte grows the existing line, an iced one opens a new line.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brew_core::{
    Consumption, CoreError, CoreResult, OrderItem, Temperature, MAX_LINE_QUANTITY,
    MAX_ORDER_ITEMS,
};

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart.
///
/// Name and unit price are frozen at the moment of adding: a menu edit
/// after that does not change what this cart charges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Menu item id; key into the recipe catalog.
    pub menu_item_id: String,

    /// Display name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub unit_price: f64,

    pub quantity: u32,

    pub temperature: Temperature,

    pub consumption: Consumption,

    /// Free-form barista note ("oat milk", "extra hot").
    pub note: Option<String>,

    /// When this line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(
        menu_item_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: f64,
        quantity: u32,
        temperature: Temperature,
        consumption: Consumption,
    ) -> CartItem {
        CartItem {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            temperature,
            consumption,
            note: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> CartItem {
        self.note = Some(note.into());
        self
    }

    /// Whether two lines merge: same item, same temperature, same
    /// dine-in/take-away choice.
    fn is_same_line(&self, other: &CartItem) -> bool {
        self.menu_item_id == other.menu_item_id
            && self.temperature == other.temperature
            && self.consumption == other.consumption
    }

    /// Line total: `unit price × quantity`.
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    /// The order line this cart line becomes at submission.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            menu_item_id: self.menu_item_id.clone(),
            name: self.name.clone(),
            quantity: self.quantity,
            price: self.unit_price,
            temperature: self.temperature,
            consumption: self.consumption,
            note: self.note.clone(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The register's in-progress order.
///
/// ## Invariants
/// - Lines are unique by `(menu_item_id, temperature, consumption)`
/// - `quantity` per line stays within `MAX_LINE_QUANTITY`
/// - At most `MAX_ORDER_ITEMS` lines
///
/// The discount is stored as entered; `validate_order` rejects an
/// out-of-range value at submission, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// Whole-order discount as entered at the register.
    pub discount: f64,

    /// When the cart was created or last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Cart {
        Cart {
            items: Vec::new(),
            discount: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Adds a line, merging with an existing one for the same
    /// item/temperature/consumption.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        if let Some(existing) = self.items.iter_mut().find(|line| line.is_same_line(&item)) {
            let merged = existing.quantity.saturating_add(item.quantity);
            if merged > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = merged;
            return Ok(());
        }

        if item.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if self.items.len() >= MAX_ORDER_ITEMS {
            return Err(CoreError::OrderTooLarge {
                max: MAX_ORDER_ITEMS,
            });
        }

        self.items.push(item);
        Ok(())
    }

    /// Sets a line's quantity; `0` removes the line. A line that is no
    /// longer in the cart is a no-op.
    pub fn update_quantity(
        &mut self,
        menu_item_id: &str,
        temperature: Temperature,
        consumption: Consumption,
        quantity: u32,
    ) -> CoreResult<()> {
        if quantity == 0 {
            self.remove_item(menu_item_id, temperature, consumption);
            return Ok(());
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if let Some(line) = self.items.iter_mut().find(|line| {
            line.menu_item_id == menu_item_id
                && line.temperature == temperature
                && line.consumption == consumption
        }) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(
        &mut self,
        menu_item_id: &str,
        temperature: Temperature,
        consumption: Consumption,
    ) -> bool {
        let before = self.items.len();
        self.items.retain(|line| {
            !(line.menu_item_id == menu_item_id
                && line.temperature == temperature
                && line.consumption == consumption)
        });
        self.items.len() != before
    }

    /// Empties the cart and resets the discount.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = 0.0;
        self.created_at = Utc::now();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total drinks across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Display total, floored at zero. The submitted order recomputes its
    /// totals after validation.
    pub fn total(&self) -> f64 {
        (self.subtotal() - self.discount).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The order lines this cart submits as.
    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.items.iter().map(CartItem::to_order_item).collect()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Shared cart handle.
///
/// ## Thread Safety
/// `Arc<Mutex<Cart>>`: the register UI and the orchestrator both touch
/// the cart, and every operation is a short exclusive mutation. Cloning
/// the handle shares the same cart; the contents are never copied.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> CartState {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Runs `f` with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn latte(quantity: u32) -> CartItem {
        CartItem::new(
            "menu-latte",
            "Latte",
            4.5,
            quantity,
            Temperature::Hot,
            Consumption::DineIn,
        )
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        cart.add_item(latte(2)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), 9.0);
    }

    #[test]
    fn test_same_line_merges_quantity() {
        let mut cart = Cart::new();
        cart.add_item(latte(2)).unwrap();
        cart.add_item(latte(3)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_different_temperature_opens_new_line() {
        let mut cart = Cart::new();
        cart.add_item(latte(1)).unwrap();

        let mut iced = latte(1);
        iced.temperature = Temperature::Iced;
        cart.add_item(iced).unwrap();

        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_merge_respects_quantity_cap() {
        let mut cart = Cart::new();
        cart.add_item(latte(998)).unwrap();

        let err = cart.add_item(latte(2)).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        // The existing line is unchanged.
        assert_eq!(cart.total_quantity(), 998);
    }

    #[test]
    fn test_line_cap() {
        let mut cart = Cart::new();
        for i in 0..MAX_ORDER_ITEMS {
            cart.add_item(CartItem::new(
                format!("menu-{i}"),
                format!("Item {i}"),
                2.0,
                1,
                Temperature::Hot,
                Consumption::DineIn,
            ))
            .unwrap();
        }

        let err = cart.add_item(latte(1)).unwrap_err();
        assert!(matches!(err, CoreError::OrderTooLarge { .. }));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_item(latte(2)).unwrap();

        cart.update_quantity("menu-latte", Temperature::Hot, Consumption::DineIn, 0)
            .unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.update_quantity("menu-mocha", Temperature::Hot, Consumption::DineIn, 3)
            .unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(latte(2)).unwrap();

        assert!(cart.remove_item("menu-latte", Temperature::Hot, Consumption::DineIn));
        assert!(!cart.remove_item("menu-latte", Temperature::Hot, Consumption::DineIn));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_resets_discount() {
        let mut cart = Cart::new();
        cart.add_item(latte(2)).unwrap();
        cart.discount = 1.5;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.discount, 0.0);
    }

    #[test]
    fn test_total_floors_at_zero() {
        let mut cart = Cart::new();
        cart.add_item(latte(1)).unwrap();
        cart.discount = 100.0;

        // Display figure only; validation rejects this discount at submit.
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn test_to_order_items_carries_note() {
        let mut cart = Cart::new();
        cart.add_item(latte(2).with_note("oat milk")).unwrap();

        let items = cart.to_order_items();
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, 4.5);
        assert_eq!(items[0].note.as_deref(), Some("oat milk"));
    }

    #[test]
    fn test_state_clone_shares_cart() {
        let state = CartState::new();
        let handle = state.clone();

        handle.with_cart_mut(|cart| cart.add_item(latte(1))).unwrap();

        assert_eq!(state.with_cart(|cart| cart.item_count()), 1);
    }
}
