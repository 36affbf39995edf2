//! # Receipt Printing
//!
//! Best-effort receipt output, decoupled from the submission pipeline.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Print Spooler                                    │
//! │                                                                         │
//! │  orchestrator ──► SpoolerHandle::enqueue(Receipt)                       │
//! │                        │                                                │
//! │                        │ mpsc command channel                           │
//! │                        ▼                                                │
//! │                  ┌───────────┐      print_receipt()   ┌──────────────┐  │
//! │                  │  spooler  │ ────────────────────►  │ dyn Receipt  │  │
//! │                  │   task    │                        │   Printer    │  │
//! │                  └─────┬─────┘                        └──────────────┘  │
//! │                        │                                                │
//! │                        ├── success ──► PrintOutcome::Printed            │
//! │                        └── failure ──► info notice +                    │
//! │                                        PrintOutcome::Failed             │
//! │                                                                         │
//! │  A print failure never fails the order: the sale is already             │
//! │  committed by the time the receipt is queued.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use brew_core::{Order, PaymentMethod};

use crate::config::ShopContext;
use crate::error::PrinterError;
use crate::notify::{Notice, NotificationSink};

/// Queued receipts before `enqueue` applies backpressure.
const PRINT_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// Receipt
// =============================================================================

/// One printed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Everything the printer needs, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub order_id: String,

    /// Short reference shown to the customer, `YYYYMMDD-SS-NNNN`.
    pub order_reference: String,

    pub shop_name: String,

    /// Submission time of the order, in UTC.
    pub issued_at: DateTime<Utc>,

    pub lines: Vec<ReceiptLine>,

    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
}

impl Receipt {
    /// Renders a committed order into its receipt view.
    pub fn for_order(order: &Order, ctx: &ShopContext, order_reference: &str) -> Receipt {
        Receipt {
            order_id: order.id.clone(),
            order_reference: order_reference.to_string(),
            shop_name: ctx.shop_name.clone(),
            issued_at: order.created_at,
            lines: order
                .items
                .iter()
                .map(|item| ReceiptLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.price,
                    line_total: item.line_total(),
                })
                .collect(),
            subtotal: order.subtotal,
            discount: order.discount,
            total: order.total,
            payment_method: order.payment_method,
        }
    }
}

// =============================================================================
// Printer Trait
// =============================================================================

/// Hardware seam. Implementations drive an ESC/POS device, a PDF file, or
/// nothing at all.
#[async_trait]
pub trait ReceiptPrinter: Send + Sync {
    async fn print_receipt(&self, receipt: &Receipt) -> Result<(), PrinterError>;
}

// =============================================================================
// Print Outcome
// =============================================================================

/// What became of one queued receipt, reported on the spooler's outcome
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintOutcome {
    Printed { order_id: String },
    Failed { order_id: String, error: PrinterError },
}

// =============================================================================
// Print Spooler
// =============================================================================

/// Commands for the spooler task.
#[derive(Debug)]
enum SpoolerCommand {
    /// Print one receipt.
    Print(Receipt),
    /// Stop the spooler. Receipts queued behind this command are dropped.
    Shutdown,
}

/// Handle for queueing receipts on the spooler task.
#[derive(Clone)]
pub struct SpoolerHandle {
    cmd_tx: mpsc::Sender<SpoolerCommand>,
}

impl SpoolerHandle {
    /// Queues a receipt. Fails only when the spooler task is gone.
    pub async fn enqueue(&self, receipt: Receipt) -> Result<(), PrinterError> {
        self.cmd_tx
            .send(SpoolerCommand::Print(receipt))
            .await
            .map_err(|_| PrinterError::SpoolerStopped)
    }

    /// Shuts the spooler down.
    pub async fn shutdown(&self) -> Result<(), PrinterError> {
        self.cmd_tx
            .send(SpoolerCommand::Shutdown)
            .await
            .map_err(|_| PrinterError::SpoolerStopped)
    }
}

/// Background task that feeds receipts to the printer one at a time.
pub struct PrintSpooler {
    printer: Arc<dyn ReceiptPrinter>,
    notifier: Arc<dyn NotificationSink>,
    outcome_tx: mpsc::UnboundedSender<PrintOutcome>,
}

impl PrintSpooler {
    /// Spawns the spooler task and returns its handle plus the outcome
    /// channel. The channel closes when the task exits.
    pub fn start(
        printer: Arc<dyn ReceiptPrinter>,
        notifier: Arc<dyn NotificationSink>,
    ) -> (SpoolerHandle, mpsc::UnboundedReceiver<PrintOutcome>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(PRINT_QUEUE_CAPACITY);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let spooler = PrintSpooler {
            printer,
            notifier,
            outcome_tx,
        };
        tokio::spawn(async move {
            spooler.run(cmd_rx).await;
        });

        (SpoolerHandle { cmd_tx }, outcome_rx)
    }

    /// Main spooler loop.
    async fn run(self, mut cmd_rx: mpsc::Receiver<SpoolerCommand>) {
        info!("Print spooler started");

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                SpoolerCommand::Shutdown => {
                    info!("Print spooler shutting down");
                    break;
                }
                SpoolerCommand::Print(receipt) => self.handle_print(receipt).await,
            }
        }

        info!("Print spooler stopped");
    }

    async fn handle_print(&self, receipt: Receipt) {
        match self.printer.print_receipt(&receipt).await {
            Ok(()) => {
                info!(
                    order_id = %receipt.order_id,
                    reference = %receipt.order_reference,
                    "Receipt printed"
                );
                let _ = self.outcome_tx.send(PrintOutcome::Printed {
                    order_id: receipt.order_id,
                });
            }
            Err(err) => {
                warn!(order_id = %receipt.order_id, %err, "Receipt print failed");
                self.notifier.notify(Notice::info(format!(
                    "Receipt for order {} was not printed: {err}",
                    receipt.order_reference
                )));
                let _ = self.outcome_tx.send(PrintOutcome::Failed {
                    order_id: receipt.order_id,
                    error: err,
                });
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChannelNotifier;
    use brew_core::{Consumption, OrderItem, Temperature};
    use std::sync::Mutex;

    /// Printer double that records every order id it prints.
    struct RecordingPrinter {
        printed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReceiptPrinter for RecordingPrinter {
        async fn print_receipt(&self, receipt: &Receipt) -> Result<(), PrinterError> {
            self.printed.lock().unwrap().push(receipt.order_id.clone());
            Ok(())
        }
    }

    /// Printer double with no paper, no ribbon, no hope.
    struct DeadPrinter;

    #[async_trait]
    impl ReceiptPrinter for DeadPrinter {
        async fn print_receipt(&self, _receipt: &Receipt) -> Result<(), PrinterError> {
            Err(PrinterError::NotConnected)
        }
    }

    fn sample_receipt() -> Receipt {
        let order = Order::assemble(
            vec![OrderItem {
                menu_item_id: "menu-latte".to_string(),
                name: "Latte".to_string(),
                quantity: 2,
                price: 4.5,
                temperature: Temperature::Hot,
                consumption: Consumption::DineIn,
                note: None,
            }],
            0.0,
            PaymentMethod::Card,
            None,
            Utc::now(),
        );
        let ctx = ShopContext::new("s-17", "Corner Brew");
        Receipt::for_order(&order, &ctx, "20260825-17-0042")
    }

    #[test]
    fn test_receipt_view_freezes_totals() {
        let receipt = sample_receipt();
        assert_eq!(receipt.shop_name, "Corner Brew");
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].line_total, 9.0);
        assert_eq!(receipt.total, 9.0);
    }

    #[tokio::test]
    async fn test_spooler_prints_and_reports() {
        let printer = Arc::new(RecordingPrinter {
            printed: Mutex::new(Vec::new()),
        });
        let (notifier, _notices) = ChannelNotifier::new();
        let (handle, mut outcomes) = PrintSpooler::start(printer.clone(), Arc::new(notifier));

        let receipt = sample_receipt();
        let order_id = receipt.order_id.clone();
        handle.enqueue(receipt).await.unwrap();

        assert_eq!(
            outcomes.recv().await.unwrap(),
            PrintOutcome::Printed {
                order_id: order_id.clone()
            }
        );
        assert_eq!(*printer.printed.lock().unwrap(), vec![order_id]);
    }

    #[tokio::test]
    async fn test_print_failure_becomes_info_notice() {
        let (notifier, mut notices) = ChannelNotifier::new();
        let (handle, mut outcomes) = PrintSpooler::start(Arc::new(DeadPrinter), Arc::new(notifier));

        handle.enqueue(sample_receipt()).await.unwrap();

        match outcomes.recv().await.unwrap() {
            PrintOutcome::Failed { error, .. } => assert_eq!(error, PrinterError::NotConnected),
            other => panic!("expected failure, got {other:?}"),
        }

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, crate::notify::NoticeLevel::Info);
        assert!(notice.message.contains("20260825-17-0042"));
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_reports_stopped() {
        let (notifier, _notices) = ChannelNotifier::new();
        let (handle, mut outcomes) = PrintSpooler::start(Arc::new(DeadPrinter), Arc::new(notifier));

        handle.shutdown().await.unwrap();
        // Outcome channel closing means the task is really gone.
        assert!(outcomes.recv().await.is_none());

        let err = handle.enqueue(sample_receipt()).await.unwrap_err();
        assert_eq!(err, PrinterError::SpoolerStopped);
    }
}
