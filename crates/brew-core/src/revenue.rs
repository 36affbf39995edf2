//! # Revenue Rollup
//!
//! Per-shop-per-day order statistics, one document per calendar day.
//!
//! ## Rollup Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RevenueRecord (shop "s-17", 2026-08-25)                                │
//! │                                                                         │
//! │  revenue            = 412.50          totalOrders = 57                  │
//! │  averageOrderValue  = revenue / totalOrders                             │
//! │                                                                         │
//! │  topSellingItems    { "menu-latte": 31, "menu-mocha": 12, ... }         │
//! │  peakHours          { 8: 96.0, 9: 120.5, 14: 38.0, ... }                │
//! │  dayOfWeekRevenue   { 2: 412.50 }            (Sunday = 0)               │
//! │  paymentMethods     { "cash": 20, "card": 37 }                          │
//! │                                                                         │
//! │  newCustomers / returningCustomers / totalCustomers                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Day" always means the shop's local day, not UTC: an order rung up at
//! 23:30 local belongs to that local date wherever the server is. Callers
//! derive the local date/hour/weekday once via [`shop_local_parts`] and
//! pass them in, keeping this module free of clock lookups.
//!
//! Customer counters follow the register's convention: a walk-in order with
//! no attached member counts toward `newCustomers`, an order rung up against
//! a member counts toward `returningCustomers`.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::order::{Order, PaymentMethod};

// =============================================================================
// Revenue Record
// =============================================================================

/// One shop-day's aggregated order statistics.
///
/// Maps are `BTreeMap` so a record always serializes with deterministic key
/// order; two equal records produce byte-identical documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueRecord {
    pub shop_id: String,

    /// Shop-local calendar day this record covers.
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// Sum of order totals.
    pub revenue: f64,

    pub total_orders: u32,

    /// `revenue / totalOrders`; `0` while the record is empty.
    pub average_order_value: f64,

    /// Units sold per menu item id.
    #[ts(type = "Record<string, number>")]
    pub top_selling_items: BTreeMap<String, u32>,

    /// Revenue keyed by local hour of day (0–23).
    #[ts(type = "Record<string, number>")]
    pub peak_hours: BTreeMap<u32, f64>,

    /// Revenue keyed by local weekday, Sunday = 0.
    #[ts(type = "Record<string, number>")]
    pub day_of_week_revenue: BTreeMap<u32, f64>,

    /// Orders with no attached member.
    pub new_customers: u32,

    /// Orders rung up against a member.
    pub returning_customers: u32,

    /// Always `newCustomers + returningCustomers`.
    pub total_customers: u32,

    /// Order count per payment method.
    #[ts(type = "Record<string, number>")]
    pub payment_methods: BTreeMap<PaymentMethod, u32>,
}

impl RevenueRecord {
    /// An empty record for the given shop-day.
    pub fn empty(shop_id: impl Into<String>, date: NaiveDate) -> RevenueRecord {
        RevenueRecord {
            shop_id: shop_id.into(),
            date,
            revenue: 0.0,
            total_orders: 0,
            average_order_value: 0.0,
            top_selling_items: BTreeMap::new(),
            peak_hours: BTreeMap::new(),
            day_of_week_revenue: BTreeMap::new(),
            new_customers: 0,
            returning_customers: 0,
            total_customers: 0,
            payment_methods: BTreeMap::new(),
        }
    }

    /// A record seeded entirely from one order, the first of its day.
    pub fn seeded_from(
        order: &Order,
        shop_id: impl Into<String>,
        date: NaiveDate,
        hour: u32,
        weekday: u32,
    ) -> RevenueRecord {
        let mut record = RevenueRecord::empty(shop_id, date);
        record.merge_order(order, hour, weekday);
        record
    }

    /// Folds one order into the rollup.
    ///
    /// `hour` and `weekday` are the order's shop-local hour-of-day and
    /// weekday (Sunday = 0), as produced by [`shop_local_parts`].
    pub fn merge_order(&mut self, order: &Order, hour: u32, weekday: u32) {
        self.revenue += order.total;
        self.total_orders += 1;
        self.average_order_value = self.revenue / f64::from(self.total_orders);

        for item in &order.items {
            *self
                .top_selling_items
                .entry(item.menu_item_id.clone())
                .or_insert(0) += item.quantity;
        }

        *self.peak_hours.entry(hour).or_insert(0.0) += order.total;
        *self.day_of_week_revenue.entry(weekday).or_insert(0.0) += order.total;

        if order.customer.is_some() {
            self.returning_customers += 1;
        } else {
            self.new_customers += 1;
        }
        self.total_customers = self.new_customers + self.returning_customers;

        *self.payment_methods.entry(order.payment_method).or_insert(0) += 1;
    }

    /// Whether `averageOrderValue` agrees with `revenue / totalOrders`
    /// within the shared float tolerance.
    pub fn average_is_consistent(&self) -> bool {
        if self.total_orders == 0 {
            return self.average_order_value == 0.0;
        }
        let expected = self.revenue / f64::from(self.total_orders);
        (self.average_order_value - expected).abs() < crate::FLOAT_TOLERANCE
    }
}

// =============================================================================
// Shop-Local Time
// =============================================================================

/// Re-expresses a UTC instant in a shop's local time and returns the parts
/// revenue keying needs: `(local date, hour 0–23, weekday with Sunday = 0)`.
///
/// `utc_offset_minutes` is the shop's fixed offset from UTC (e.g. +540 for
/// UTC+9). An out-of-range offset falls back to UTC rather than failing:
/// a misconfigured shop should still record revenue, just in UTC days.
pub fn shop_local_parts(at: DateTime<Utc>, utc_offset_minutes: i32) -> (NaiveDate, u32, u32) {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    let local = at.with_timezone(&offset);
    (
        local.date_naive(),
        local.hour(),
        local.weekday().num_days_from_sunday(),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Consumption, CustomerRef, OrderItem, Temperature};

    fn order_with_total(total: f64, customer: Option<CustomerRef>) -> Order {
        Order::assemble(
            vec![OrderItem {
                menu_item_id: "menu-latte".to_string(),
                name: "Latte".to_string(),
                quantity: 1,
                price: total,
                temperature: Temperature::Hot,
                consumption: Consumption::TakeAway,
                note: None,
            }],
            0.0,
            PaymentMethod::Cash,
            customer,
            Utc::now(),
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
    }

    #[test]
    fn test_first_order_seeds_record() {
        let order = order_with_total(4.5, None);
        let record = RevenueRecord::seeded_from(&order, "shop-17", day(), 9, 2);

        assert_eq!(record.total_orders, 1);
        assert_eq!(record.revenue, 4.5);
        assert_eq!(record.average_order_value, 4.5);
        assert_eq!(record.top_selling_items["menu-latte"], 1);
        assert_eq!(record.peak_hours[&9], 4.5);
        assert_eq!(record.day_of_week_revenue[&2], 4.5);
        assert_eq!(record.new_customers, 1);
        assert_eq!(record.returning_customers, 0);
        assert_eq!(record.payment_methods[&PaymentMethod::Cash], 1);
        assert!(record.average_is_consistent());
    }

    #[test]
    fn test_second_order_merges_and_averages() {
        let first = order_with_total(4.5, None);
        let second = order_with_total(6.0, None);

        let mut record = RevenueRecord::seeded_from(&first, "shop-17", day(), 9, 2);
        record.merge_order(&second, 14, 2);

        assert_eq!(record.total_orders, 2);
        assert!((record.revenue - 10.5).abs() < 1e-9);
        assert!((record.average_order_value - 5.25).abs() < 1e-9);
        assert_eq!(record.top_selling_items["menu-latte"], 2);
        assert_eq!(record.peak_hours[&9], 4.5);
        assert_eq!(record.peak_hours[&14], 6.0);
        assert!((record.day_of_week_revenue[&2] - 10.5).abs() < 1e-9);
        assert!(record.average_is_consistent());
    }

    #[test]
    fn test_customer_counters() {
        let walk_in = order_with_total(4.5, None);
        let member = order_with_total(6.0, Some(CustomerRef {
            id: "cust-1".to_string(),
            name: "Mina".to_string(),
        }));

        let mut record = RevenueRecord::empty("shop-17", day());
        record.merge_order(&walk_in, 9, 2);
        record.merge_order(&member, 10, 2);

        assert_eq!(record.new_customers, 1);
        assert_eq!(record.returning_customers, 1);
        assert_eq!(record.total_customers, 2);
    }

    #[test]
    fn test_payment_method_counts() {
        let mut cash = order_with_total(4.5, None);
        cash.payment_method = PaymentMethod::Cash;
        let mut card = order_with_total(6.0, None);
        card.payment_method = PaymentMethod::Card;

        let mut record = RevenueRecord::empty("shop-17", day());
        record.merge_order(&cash, 9, 2);
        record.merge_order(&card, 9, 2);
        record.merge_order(&cash, 10, 2);

        assert_eq!(record.payment_methods[&PaymentMethod::Cash], 2);
        assert_eq!(record.payment_methods[&PaymentMethod::Card], 1);
    }

    #[test]
    fn test_empty_record_average_is_consistent() {
        let record = RevenueRecord::empty("shop-17", day());
        assert!(record.average_is_consistent());
    }

    #[test]
    fn test_serialized_key_order_is_deterministic() {
        let mut a = RevenueRecord::empty("shop-17", day());
        let mut b = RevenueRecord::empty("shop-17", day());
        let order = order_with_total(4.5, None);

        // Insert in different call orders; BTreeMap sorts both the same.
        a.merge_order(&order, 14, 2);
        a.merge_order(&order, 9, 2);
        b.merge_order(&order, 9, 2);
        b.merge_order(&order, 14, 2);

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_local_parts_cross_midnight_forward() {
        // 23:30 UTC on a Tuesday, shop at UTC+2: local Wednesday 01:30.
        let at = DateTime::parse_from_rfc3339("2026-08-25T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (date, hour, weekday) = shop_local_parts(at, 120);

        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 26).unwrap());
        assert_eq!(hour, 1);
        assert_eq!(weekday, 3); // Wednesday, Sunday = 0
    }

    #[test]
    fn test_local_parts_cross_midnight_backward() {
        // 02:30 UTC on a Tuesday, shop at UTC-5: local Monday 21:30.
        let at = DateTime::parse_from_rfc3339("2026-08-25T02:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (date, hour, weekday) = shop_local_parts(at, -300);

        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
        assert_eq!(hour, 21);
        assert_eq!(weekday, 1); // Monday
    }

    #[test]
    fn test_local_parts_out_of_range_offset_falls_back_to_utc() {
        let at = DateTime::parse_from_rfc3339("2026-08-25T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (date, hour, _) = shop_local_parts(at, 100_000);

        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        assert_eq!(hour, 12);
    }
}
