use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{TransferDestination, TransferOrder, TransferOrderStatus, WarehouseId},
    CoreContext,
};

lazy_static! {
    static ref TRANSFERS_CREATED: IntCounter = IntCounter::new(
        "transfer_orders_created_total",
        "Total number of transfer orders created"
    )
    .expect("metric can be created");
    static ref TRANSFER_CREATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "transfer_order_creation_failures_total",
            "Total number of failed transfer order creations"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Creates a transfer order and deducts every line from the SOURCE warehouse
/// immediately. This is the asymmetry with reseller orders: a transfer's
/// forward stock effect runs at creation time, not at completion.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTransferOrderCommand {
    pub from_location: WarehouseId,
    pub destination: TransferDestination,
    pub items: BTreeMap<String, i32>,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransferOrderResult {
    pub transfer_id: Uuid,
    pub from_location: WarehouseId,
    pub destination: TransferDestination,
    pub status: TransferOrderStatus,
}

#[async_trait::async_trait]
impl Command for CreateTransferOrderCommand {
    type Result = CreateTransferOrderResult;

    #[instrument(skip(self, ctx, events), fields(from = %self.from_location, to = %self.destination))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            TRANSFER_CREATION_FAILURES
                .with_label_values(&["validation_error"])
                .inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        if self.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "transfer has no items".to_string(),
            ));
        }
        if let Some((key, _)) = self.items.iter().find(|(_, qty)| **qty <= 0) {
            return Err(ServiceError::ValidationError(format!(
                "quantity for {} must be positive",
                key
            )));
        }
        if self.destination == TransferDestination::Warehouse(self.from_location) {
            return Err(ServiceError::ValidationError(
                "source and destination are the same warehouse".to_string(),
            ));
        }

        let mut order = TransferOrder::new(
            self.from_location,
            self.destination.clone(),
            self.items.clone(),
            self.total_amount,
        );
        ctx.orders.apply_transfer(order.clone());

        // Source deduction, one independent write per line. Lines that do
        // not resolve against the source ledger are skipped, not failed.
        for (key, quantity) in &order.items {
            match ctx.ledger.resolve_line(self.from_location, key) {
                Some(ledger_key) => match ctx.ledger.adjust(&ledger_key, -quantity).await {
                    Ok(new_quantity) => events.emit(Event::StockAdjusted {
                        key: key.clone(),
                        delta: -quantity,
                        new_quantity,
                    }),
                    Err(e) => {
                        TRANSFER_CREATION_FAILURES
                            .with_label_values(&["ledger_write"])
                            .inc();
                        // Drop the optimistic order row. Lines already
                        // deducted stay applied.
                        ctx.orders.discard_transfer(order.id);
                        return Err(e);
                    }
                },
                None => warn!(
                    line = %key,
                    source = %self.from_location,
                    "transfer line does not resolve against source ledger; skipping"
                ),
            }
        }

        order.is_deducted = true;
        ctx.orders.apply_transfer(order.clone());
        if let Err(e) = ctx.orders.persist_transfer(&order).await {
            TRANSFER_CREATION_FAILURES
                .with_label_values(&["persistence"])
                .inc();
            ctx.orders.discard_transfer(order.id);
            return Err(e);
        }

        events.emit(Event::TransferCreated(order.id));
        TRANSFERS_CREATED.inc();
        info!(transfer_id = %order.id, "transfer order created, source deducted");

        Ok(CreateTransferOrderResult {
            transfer_id: order.id,
            from_location: order.from_location,
            destination: order.destination,
            status: order.status,
        })
    }
}
