//! # Input Validation
//!
//! Pure validation functions used before an order enters the fulfillment
//! pipeline. Each function returns `Ok(())` or the first violation found.
//!
//! Validation runs once, at the Building stage; everything downstream
//! (reservation, aggregation, accrual) trusts these checks and does not
//! repeat them.

use crate::error::{ValidationError, ValidationResult};
use crate::order::OrderItem;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_ITEMS};

/// Validates a single line's quantity: at least 1, at most
/// [`MAX_LINE_QUANTITY`].
pub fn validate_line_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_LINE_QUANTITY),
        });
    }
    Ok(())
}

/// Validates a unit price: finite and non-negative.
///
/// Zero is allowed; staff drinks are rung up at 0.00.
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a discount against the order subtotal.
pub fn validate_discount(subtotal: f64, discount: f64) -> ValidationResult<()> {
    if !discount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "discount".to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    if discount < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "discount".to_string(),
        });
    }
    if discount > subtotal {
        return Err(ValidationError::DiscountExceedsSubtotal { discount, subtotal });
    }
    Ok(())
}

/// Validates a whole order before assembly.
///
/// Checks, in order: the order is non-empty and within the line limit,
/// every line has an id, a name, a legal quantity and price, and the
/// discount fits under the subtotal.
pub fn validate_order(items: &[OrderItem], discount: f64) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in items {
        if item.menu_item_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "menuItemId".to_string(),
            });
        }
        if item.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            });
        }
        validate_line_quantity(item.quantity)?;
        validate_unit_price(item.price)?;
    }

    let subtotal: f64 = items.iter().map(OrderItem::line_total).sum();
    validate_discount(subtotal, discount)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
