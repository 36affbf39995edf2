//! # Loyalty Accrual
//!
//! Credits loyalty points to members when their orders complete.
//!
//! Points are `order.total × rate`, where the rate is the shop's own
//! override or the engine default. The credit is a read-accrue-write
//! transaction on the member document, so two registers closing orders
//! for the same member serialize instead of one credit overwriting the
//! other. Walk-in orders carry no member and never touch the store.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use brew_core::{Customer, CustomerRef, Order};
use brew_store::{DocumentStore, StoreError, StoreResult, TransactionRunner, TxnError};

use crate::config::{EngineConfig, ShopContext};
use crate::paths;

/// Awards points to members and registers new ones.
pub struct LoyaltyAccrual {
    store: Arc<dyn DocumentStore>,
    runner: TransactionRunner,
    default_point_rate: f64,
}

impl LoyaltyAccrual {
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> LoyaltyAccrual {
        LoyaltyAccrual {
            store,
            runner: TransactionRunner::new(config.retry.clone()),
            default_point_rate: config.point_rate,
        }
    }

    /// Resolves a member by phone number, registering a new one if no
    /// document matches.
    ///
    /// Phone numbers are the register's lookup key but are not unique;
    /// the first match wins.
    pub async fn ensure_customer(
        &self,
        ctx: &ShopContext,
        name: &str,
        phone_number: &str,
    ) -> StoreResult<CustomerRef> {
        let collection = paths::customers(&ctx.shop_id);
        for doc in self.store.list(&collection).await? {
            let customer: Customer = doc.decode()?;
            if customer.phone_number == phone_number {
                debug!(customer_id = %customer.id, "Member matched by phone");
                return Ok(CustomerRef {
                    id: customer.id,
                    name: customer.name,
                });
            }
        }

        let customer = Customer::new(name, phone_number, Utc::now());
        self.store
            .create(
                &collection.doc(&customer.id),
                serde_json::to_value(&customer)?,
            )
            .await?;
        info!(customer_id = %customer.id, shop_id = %ctx.shop_id, "Member registered");
        Ok(CustomerRef {
            id: customer.id,
            name: customer.name,
        })
    }

    /// Credits the order's member with `total × rate` points and returns
    /// the amount earned.
    ///
    /// A walk-in order, or a rate of zero, earns nothing and leaves the
    /// store untouched. An order pointing at a member document that does
    /// not exist is an error; the caller decides how loudly to fail.
    pub async fn accrue(&self, ctx: &ShopContext, order: &Order) -> Result<f64, TxnError> {
        let Some(customer) = &order.customer else {
            return Ok(0.0);
        };

        let rate = ctx.effective_point_rate(self.default_point_rate);
        let earned = order.total * rate;
        if earned <= 0.0 {
            debug!(order_id = %order.id, rate, "No points to accrue");
            return Ok(0.0);
        }

        let path = paths::customers(&ctx.shop_id).doc(&customer.id);
        self.runner
            .run_atomic(self.store.as_ref(), move |tx| {
                let path = path.clone();
                Box::pin(async move {
                    let Some(mut member) = tx.read::<Customer>(&path).await? else {
                        return Err(TxnError::Store(StoreError::NotFound {
                            path: path.to_string(),
                        }));
                    };
                    member.accrue(earned, Utc::now());
                    tx.write(&path, &member)?;
                    Ok(())
                })
            })
            .await?;

        info!(
            customer_id = %customer.id,
            order_id = %order.id,
            points = earned,
            "Loyalty points accrued"
        );
        Ok(earned)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::{Consumption, OrderItem, PaymentMethod, Temperature};
    use brew_store::MemoryStore;

    fn shop() -> ShopContext {
        ShopContext::new("s-17", "Corner Brew")
    }

    fn accrual(store: &MemoryStore) -> LoyaltyAccrual {
        LoyaltyAccrual::new(Arc::new(store.clone()), &EngineConfig::default())
    }

    fn order_for(total: f64, customer: Option<CustomerRef>) -> Order {
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

    async fn member_doc(store: &MemoryStore, id: &str) -> (Customer, u64) {
        let doc = store
            .get(&paths::customers("s-17").doc(id))
            .await
            .unwrap()
            .unwrap();
        (doc.decode().unwrap(), doc.version)
    }

    #[tokio::test]
    async fn test_walk_in_earns_nothing() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);

        let earned = accrual
            .accrue(&shop(), &order_for(40.0, None))
            .await
            .unwrap();
        assert_eq!(earned, 0.0);
        assert!(store
            .list(&paths::customers("s-17"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_accrues_at_default_rate() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);
        let ctx = shop();

        let member = accrual
            .ensure_customer(&ctx, "Mina", "0801234567")
            .await
            .unwrap();
        let earned = accrual
            .accrue(&ctx, &order_for(40.0, Some(member.clone())))
            .await
            .unwrap();

        assert!((earned - 2.0).abs() < 1e-9);
        let (doc, version) = member_doc(&store, &member.id).await;
        assert!((doc.point - 2.0).abs() < 1e-9);
        assert_eq!(version, 2);
    }

    #[tokio::test]
    async fn test_shop_rate_overrides_default() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);
        let mut ctx = shop();
        ctx.point_rate = Some(0.1);

        let member = accrual
            .ensure_customer(&ctx, "Mina", "0801234567")
            .await
            .unwrap();
        let earned = accrual
            .accrue(&ctx, &order_for(40.0, Some(member)))
            .await
            .unwrap();
        assert!((earned - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_zero_rate_touches_nothing() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);
        let mut ctx = shop();
        ctx.point_rate = Some(0.0);

        let member = accrual
            .ensure_customer(&ctx, "Mina", "0801234567")
            .await
            .unwrap();
        let earned = accrual
            .accrue(&ctx, &order_for(40.0, Some(member.clone())))
            .await
            .unwrap();

        assert_eq!(earned, 0.0);
        let (doc, version) = member_doc(&store, &member.id).await;
        assert_eq!(doc.point, 0.0);
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn test_missing_member_document_is_an_error() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);

        let ghost = CustomerRef {
            id: "no-such-member".to_string(),
            name: "Ghost".to_string(),
        };
        let err = accrual
            .accrue(&shop(), &order_for(40.0, Some(ghost)))
            .await
            .unwrap_err();
        assert!(matches!(err, TxnError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_ensure_customer_reuses_phone_match() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);
        let ctx = shop();

        let first = accrual
            .ensure_customer(&ctx, "Mina", "0801234567")
            .await
            .unwrap();
        let again = accrual
            .ensure_customer(&ctx, "Mina K.", "0801234567")
            .await
            .unwrap();
        assert_eq!(first.id, again.id);
        // The stored name is the one from registration.
        assert_eq!(again.name, "Mina");

        let other = accrual
            .ensure_customer(&ctx, "Theo", "0809999999")
            .await
            .unwrap();
        assert_ne!(first.id, other.id);
        assert_eq!(
            store.list(&paths::customers("s-17")).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_repeat_orders_accumulate_points() {
        let store = MemoryStore::new();
        let accrual = accrual(&store);
        let ctx = shop();

        let member = accrual
            .ensure_customer(&ctx, "Mina", "0801234567")
            .await
            .unwrap();
        accrual
            .accrue(&ctx, &order_for(40.0, Some(member.clone())))
            .await
            .unwrap();
        accrual
            .accrue(&ctx, &order_for(20.0, Some(member.clone())))
            .await
            .unwrap();

        let (doc, _) = member_doc(&store, &member.id).await;
        assert!((doc.point - 3.0).abs() < 1e-9);
    }
}
