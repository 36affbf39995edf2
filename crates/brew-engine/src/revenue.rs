//! # Revenue Aggregation
//!
//! Folds completed orders into pre-computed per-shop-day rollups so
//! dashboards read one document instead of scanning orders.
//!
//! A day is the SHOP's day: the order timestamp is shifted by the shop's
//! UTC offset before choosing the document, so a sale at 23:30 UTC in a
//! UTC+2 shop lands on the next calendar day. Each upsert runs as its own
//! read-merge-write transaction; two registers closing orders at once
//! serialize through version conflicts instead of losing a merge.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use brew_core::{shop_local_parts, Order, RevenueRecord};
use brew_store::{DocumentStore, StoreResult, TransactionRunner, TxnError};

use crate::config::{EngineConfig, ShopContext};
use crate::paths::{self, revenue_day_id};

/// Maintains the per-shop-day revenue rollup documents.
pub struct RevenueAggregator {
    store: Arc<dyn DocumentStore>,
    runner: TransactionRunner,
}

impl RevenueAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> RevenueAggregator {
        RevenueAggregator {
            store,
            runner: TransactionRunner::new(config.retry.clone()),
        }
    }

    /// Folds one completed order into its shop-local day document,
    /// creating the document if this is the day's first order.
    ///
    /// Returns the rollup as committed.
    pub async fn upsert_order(
        &self,
        ctx: &ShopContext,
        order: &Order,
    ) -> Result<RevenueRecord, TxnError> {
        let (date, hour, weekday) = shop_local_parts(order.created_at, ctx.utc_offset_minutes);
        let path = paths::revenue(&ctx.shop_id).doc(revenue_day_id(date));
        let shop_id = ctx.shop_id.clone();
        let order = order.clone();

        let record = self
            .runner
            .run_atomic::<_, TxnError, _>(self.store.as_ref(), move |tx| {
                let path = path.clone();
                let shop_id = shop_id.clone();
                let order = order.clone();
                Box::pin(async move {
                    let record = match tx.read::<RevenueRecord>(&path).await? {
                        Some(mut existing) => {
                            existing.merge_order(&order, hour, weekday);
                            existing
                        }
                        None => RevenueRecord::seeded_from(&order, shop_id, date, hour, weekday),
                    };
                    tx.write(&path, &record)?;
                    Ok(record)
                })
            })
            .await?;

        debug!(
            shop_id = %ctx.shop_id,
            date = %record.date,
            total_orders = record.total_orders,
            revenue = record.revenue,
            "Revenue rollup updated"
        );
        Ok(record)
    }

    /// The rollup for one shop-local day, if any order has landed on it.
    pub async fn record_for_day(
        &self,
        ctx: &ShopContext,
        date: NaiveDate,
    ) -> StoreResult<Option<RevenueRecord>> {
        let path = paths::revenue(&ctx.shop_id).doc(revenue_day_id(date));
        match self.store.get(&path).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// All rollups with `from <= date <= to`, oldest first.
    ///
    /// Day-document ids sort chronologically, so the store's id order is
    /// already date order.
    pub async fn records_between(
        &self,
        ctx: &ShopContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<RevenueRecord>> {
        let docs = self.store.list(&paths::revenue(&ctx.shop_id)).await?;
        let mut records = Vec::new();
        for doc in docs {
            let record: RevenueRecord = doc.decode()?;
            if record.date >= from && record.date <= to {
                records.push(record);
            }
        }
        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
