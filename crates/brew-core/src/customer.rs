//! # Customer
//!
//! Loyalty member document: identity plus a point balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A loyalty member.
///
/// The fulfillment pipeline only ever grows `point`; redemption and profile
/// edits happen elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4). Doubles as the document id.
    pub id: String,

    pub name: String,

    /// Lookup key at the register; not guaranteed unique.
    pub phone_number: String,

    /// Loyalty point balance.
    pub point: f64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new member with a zero point balance.
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>, at: DateTime<Utc>) -> Customer {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone_number: phone_number.into(),
            point: 0.0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Credits loyalty points.
    ///
    /// Accrual only ever adds: a non-positive `points` is ignored so a
    /// zero-rate shop or a fully discounted order cannot shrink a balance.
    pub fn accrue(&mut self, points: f64, at: DateTime<Utc>) {
        if points > 0.0 {
            self.point += points;
            self.updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_starts_at_zero() {
        let customer = Customer::new("Mina", "0801234567", Utc::now());
        assert_eq!(customer.point, 0.0);
        assert!(!customer.id.is_empty());
    }

    #[test]
    fn test_accrue_adds_points() {
        let mut customer = Customer::new("Mina", "0801234567", Utc::now());
        let at = customer.created_at + chrono::Duration::seconds(60);

        customer.accrue(0.45, at);
        customer.accrue(0.30, at);

        assert!((customer.point - 0.75).abs() < 1e-9);
        assert_eq!(customer.updated_at, at);
    }

    #[test]
    fn test_accrue_ignores_non_positive() {
        let mut customer = Customer::new("Mina", "0801234567", Utc::now());
        customer.accrue(0.0, Utc::now());
        customer.accrue(-5.0, Utc::now());
        assert_eq!(customer.point, 0.0);
    }
}
