//! # Order Orchestrator
//!
//! Drives one order submission through its stages and reports progress.
//!
//! ## Submission Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_order(ctx, request)                                             │
//! │                                                                         │
//! │  Building     validate cart, resolve member, assemble order            │
//! │      │             └─ invalid ───► Aborted, cart intact                 │
//! │  Reserving    atomic ingredient check-and-decrement                    │
//! │      │             └─ short / conflict ───► Aborted, cart intact        │
//! │  Persisting   create the order document                                │
//! │  Aggregating  fold into the shop-day revenue rollup                    │
//! │  Accruing     credit loyalty points                                    │
//! │      │             └─ failure ───► Failed, committed writes remain      │
//! │  Printing     hand the receipt to the spooler (outcome never fatal)    │
//! │  Cleared      cart emptied, success notice sent                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition lands on the event channel so a UI can render
//! progress; the notice channel carries the human-readable outcome. There
//! is no rollback: a failure after Reserving leaves the reservation (and
//! any later committed step) in place and says so.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use brew_core::{
    order_reference, shop_local_parts, validate_order, CustomerRef, LowStockAlert, Order,
    PaymentMethod,
};
use brew_store::{DocumentStore, StoreError};

use crate::cart::CartState;
use crate::catalog::MenuCatalog;
use crate::config::{EngineConfig, ShopContext};
use crate::error::{PrinterError, SubmissionStage, SubmitError};
use crate::loyalty::LoyaltyAccrual;
use crate::notify::NotificationSink;
use crate::paths;
use crate::printing::{PrintOutcome, PrintSpooler, Receipt, ReceiptPrinter, SpoolerHandle};
use crate::reservation::ReservationEngine;
use crate::revenue::RevenueAggregator;

// =============================================================================
// Submission Surface
// =============================================================================

/// Who the order is rung up for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerSelection {
    /// No member attached.
    WalkIn,
    /// An existing member picked at the register.
    Member(CustomerRef),
    /// Register a member on the spot, then attach them.
    #[serde(rename_all = "camelCase")]
    NewMember { name: String, phone_number: String },
}

/// One submission request. The lines come from the shared cart; this
/// carries everything else the register chose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub payment_method: PaymentMethod,
    pub customer: CustomerSelection,
}

/// What a completed submission hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub order_id: String,

    /// Short reference printed on the receipt, `YYYYMMDD-SS-NNNN`.
    pub order_reference: String,

    pub total: f64,

    /// Loyalty points credited; zero for walk-ins.
    pub earned_points: f64,

    /// Low-stock warnings raised by this order's reservation.
    pub alerts: Vec<LowStockAlert>,
}

/// Progress and outcome of one submission, in emit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubmissionEvent {
    /// The submission entered a stage.
    Entered { stage: SubmissionStage },
    /// Terminal: the order went through and the cart is cleared.
    Succeeded { summary: SubmissionSummary },
    /// Terminal: nothing was committed; the cart is intact.
    Aborted {
        stage: SubmissionStage,
        message: String,
    },
    /// Terminal: writes from stages before `stage` remain committed.
    Failed {
        stage: SubmissionStage,
        message: String,
    },
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Owns the submission pipeline for one terminal: the shared cart, the
/// engines, the print spooler and the event channel.
pub struct OrderOrchestrator {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn MenuCatalog>,
    cart: CartState,
    reservation: ReservationEngine,
    revenue: RevenueAggregator,
    loyalty: LoyaltyAccrual,
    notifier: Arc<dyn NotificationSink>,
    spooler: SpoolerHandle,
    events: mpsc::UnboundedSender<SubmissionEvent>,
}

impl OrderOrchestrator {
    /// Wires the full pipeline. The engines share the store, the print
    /// spooler task is started, and the returned receivers carry
    /// submission events and print outcomes.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn MenuCatalog>,
        printer: Arc<dyn ReceiptPrinter>,
        notifier: Arc<dyn NotificationSink>,
        config: &EngineConfig,
    ) -> (
        OrderOrchestrator,
        mpsc::UnboundedReceiver<SubmissionEvent>,
        mpsc::UnboundedReceiver<PrintOutcome>,
    ) {
        let (events, event_rx) = mpsc::unbounded_channel();
        let (spooler, outcome_rx) = PrintSpooler::start(printer, Arc::clone(&notifier));

        let orchestrator = OrderOrchestrator {
            reservation: ReservationEngine::new(Arc::clone(&store), config),
            revenue: RevenueAggregator::new(Arc::clone(&store), config),
            loyalty: LoyaltyAccrual::new(Arc::clone(&store), config),
            store,
            catalog,
            cart: CartState::new(),
            notifier,
            spooler,
            events,
        };
        (orchestrator, event_rx, outcome_rx)
    }

    /// Handle to the cart this orchestrator submits from. Clones share
    /// the same cart.
    pub fn cart(&self) -> CartState {
        self.cart.clone()
    }

    /// The revenue read APIs, for dashboards sharing this pipeline.
    pub fn revenue(&self) -> &RevenueAggregator {
        &self.revenue
    }

    /// Stops the print spooler; receipts queued before the call still
    /// print.
    pub async fn shutdown(&self) -> Result<(), PrinterError> {
        self.spooler.shutdown().await
    }

    /// Runs one order through the pipeline.
    ///
    /// The cart is consumed only on success. See the module diagram for
    /// which failures leave committed writes behind.
    pub async fn submit_order(
        &self,
        ctx: &ShopContext,
        request: SubmitRequest,
    ) -> Result<SubmissionSummary, SubmitError> {
        debug!(shop_id = %ctx.shop_id, "Order submission started");

        self.enter(SubmissionStage::Building);
        let (items, discount) = self
            .cart
            .with_cart(|cart| (cart.to_order_items(), cart.discount));
        if let Err(err) = validate_order(&items, discount) {
            return Err(self.abort(SubmissionStage::Building, err.into()));
        }
        let customer = match self.resolve_customer(ctx, &request.customer).await {
            Ok(customer) => customer,
            Err(err) => return Err(self.abort(SubmissionStage::Building, err)),
        };

        let order = Order::assemble(items, discount, request.payment_method, customer, Utc::now());
        let (local_date, _, _) = shop_local_parts(order.created_at, ctx.utc_offset_minutes);
        let reference = order_reference(&order.id, &ctx.shop_id, local_date);

        // The only stage that can turn the order away: everything it
        // checks, it checks atomically, and nothing is written on abort.
        self.enter(SubmissionStage::Reserving);
        let alerts = match self
            .reservation
            .reserve(ctx, &order, self.catalog.as_ref())
            .await
        {
            Ok(alerts) => alerts,
            Err(err) => return Err(self.abort(SubmissionStage::Reserving, err.into())),
        };

        // From here on the reservation is committed; failures report and
        // stop, they do not undo.
        self.enter(SubmissionStage::Persisting);
        if let Err(err) = self.persist_order(ctx, &order).await {
            return Err(self.fail(SubmissionStage::Persisting, err));
        }

        self.enter(SubmissionStage::Aggregating);
        if let Err(err) = self.revenue.upsert_order(ctx, &order).await {
            let err = SubmitError::persistence(SubmissionStage::Aggregating, err);
            return Err(self.fail(SubmissionStage::Aggregating, err));
        }

        self.enter(SubmissionStage::Accruing);
        let earned_points = match self.loyalty.accrue(ctx, &order).await {
            Ok(earned) => earned,
            Err(err) => {
                let err = SubmitError::persistence(SubmissionStage::Accruing, err);
                return Err(self.fail(SubmissionStage::Accruing, err));
            }
        };

        self.enter(SubmissionStage::Printing);
        let receipt = Receipt::for_order(&order, ctx, &reference);
        if let Err(err) = self.spooler.enqueue(receipt).await {
            warn!(order_id = %order.id, error = %err, "Receipt not queued");
            self.notifier.info(&format!(
                "Receipt for order {reference} was not printed: {err}"
            ));
        }

        self.cart.with_cart_mut(|cart| cart.clear());
        self.enter(SubmissionStage::Cleared);

        let summary = SubmissionSummary {
            order_id: order.id.clone(),
            order_reference: reference.clone(),
            total: order.total,
            earned_points,
            alerts,
        };
        self.notifier.success(&format!("Order {reference} completed"));
        for alert in &summary.alerts {
            self.notifier.info(&format!(
                "{} is low: {:.1}% of minimum stock left",
                alert.ingredient_name, alert.percentage
            ));
        }
        info!(
            order_id = %order.id,
            reference = %reference,
            total = order.total,
            earned_points,
            "Order submitted"
        );
        self.send(SubmissionEvent::Succeeded {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    async fn resolve_customer(
        &self,
        ctx: &ShopContext,
        selection: &CustomerSelection,
    ) -> Result<Option<CustomerRef>, SubmitError> {
        match selection {
            CustomerSelection::WalkIn => Ok(None),
            CustomerSelection::Member(member) => Ok(Some(member.clone())),
            CustomerSelection::NewMember { name, phone_number } => {
                let member = self
                    .loyalty
                    .ensure_customer(ctx, name, phone_number)
                    .await
                    .map_err(|err| {
                        SubmitError::persistence(SubmissionStage::Building, err)
                    })?;
                Ok(Some(member))
            }
        }
    }

    async fn persist_order(&self, ctx: &ShopContext, order: &Order) -> Result<(), SubmitError> {
        let path = paths::orders(&ctx.shop_id).doc(&order.id);
        let value = serde_json::to_value(order).map_err(|err| {
            SubmitError::persistence(SubmissionStage::Persisting, StoreError::from(err))
        })?;
        self.store
            .create(&path, value)
            .await
            .map_err(|err| SubmitError::persistence(SubmissionStage::Persisting, err))?;
        debug!(order_id = %order.id, "Order document created");
        Ok(())
    }

    fn enter(&self, stage: SubmissionStage) {
        debug!(%stage, "Submission stage entered");
        self.send(SubmissionEvent::Entered { stage });
    }

    fn abort(&self, stage: SubmissionStage, err: SubmitError) -> SubmitError {
        warn!(%stage, error = %err, "Submission aborted, nothing committed");
        self.notifier.error(&err.to_string());
        self.send(SubmissionEvent::Aborted {
            stage,
            message: err.to_string(),
        });
        err
    }

    fn fail(&self, stage: SubmissionStage, err: SubmitError) -> SubmitError {
        error!(%stage, error = %err, "Submission failed after committed writes");
        self.notifier.error(&err.to_string());
        self.send(SubmissionEvent::Failed {
            stage,
            message: err.to_string(),
        });
        err
    }

    fn send(&self, event: SubmissionEvent) {
        // Receiver gone means no UI is listening; submissions still run.
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
