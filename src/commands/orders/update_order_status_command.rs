use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::ResellerOrderStatus,
    services::stock_ledger::LedgerKey,
    CoreContext,
};

lazy_static! {
    static ref ORDER_COMPLETIONS: IntCounter = IntCounter::new(
        "reseller_order_completions_total",
        "Total number of reseller order stock deductions applied"
    )
    .expect("metric can be created");
    static ref ORDER_STATUS_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "reseller_order_status_failures_total",
            "Total number of failed reseller order status updates"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Drives the reseller-order state machine. The only transition with a
/// ledger effect is entering `Completed`: each line is deducted from the
/// primary warehouse exactly once, guarded in-session by the processing lock
/// and across sessions by `is_deducted`. Leaving `Completed` performs no
/// reversal; that asymmetry is a business rule, not an omission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusCommand {
    pub order_id: Uuid,
    pub new_status: ResellerOrderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOrderStatusResult {
    pub order_id: Uuid,
    pub old_status: ResellerOrderStatus,
    pub new_status: ResellerOrderStatus,
    pub deduction_applied: bool,
}

#[async_trait::async_trait]
impl Command for UpdateOrderStatusCommand {
    type Result = UpdateOrderStatusResult;

    #[instrument(skip(self, ctx, events), fields(order_id = %self.order_id, new_status = %self.new_status))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let _guard = match ctx.locks.acquire(self.order_id) {
            Some(guard) => guard,
            None => {
                // Duplicate rapid request for the same order: no-op.
                warn!("order already mid-transition; ignoring duplicate request");
                let current = ctx
                    .orders
                    .reseller_order(self.order_id)
                    .ok_or_else(|| not_found(self.order_id))?;
                return Ok(UpdateOrderStatusResult {
                    order_id: self.order_id,
                    old_status: current.status,
                    new_status: current.status,
                    deduction_applied: false,
                });
            }
        };

        let snapshot = ctx
            .orders
            .reseller_order(self.order_id)
            .ok_or_else(|| not_found(self.order_id))?;
        let old_status = snapshot.status;

        if old_status == self.new_status {
            return Ok(UpdateOrderStatusResult {
                order_id: self.order_id,
                old_status,
                new_status: old_status,
                deduction_applied: false,
            });
        }

        // Fixed sequence: optimistic status write, ledger effects, persisted
        // confirmation. Not atomic; each failure branch compensates what it
        // still can.
        let mut updated = snapshot.clone();
        updated.status = self.new_status;
        ctx.orders.apply_reseller(updated.clone());

        let mut deduction_applied = false;
        if self.new_status == ResellerOrderStatus::Completed && !updated.is_deducted {
            for (sku, quantity) in &updated.items {
                match ctx
                    .ledger
                    .adjust(&LedgerKey::Primary(sku.clone()), -quantity)
                    .await
                {
                    Ok(new_quantity) => events.emit(Event::StockAdjusted {
                        key: sku.clone(),
                        delta: -quantity,
                        new_quantity,
                    }),
                    Err(e) => {
                        ORDER_STATUS_FAILURES
                            .with_label_values(&["ledger_write"])
                            .inc();
                        // Restore the optimistic status flip. Lines already
                        // deducted stay applied; see the persistence notes.
                        ctx.orders.apply_reseller(snapshot);
                        return Err(e);
                    }
                }
            }
            updated.is_deducted = true;
            ctx.orders.apply_reseller(updated.clone());
            deduction_applied = true;
        }

        if let Err(e) = ctx.orders.persist_reseller(&updated).await {
            ORDER_STATUS_FAILURES
                .with_label_values(&["persistence"])
                .inc();
            ctx.orders.apply_reseller(snapshot);
            return Err(e);
        }

        events.emit(Event::OrderStatusChanged {
            order_id: self.order_id,
            old_status: old_status.to_string(),
            new_status: self.new_status.to_string(),
        });
        if deduction_applied {
            events.emit(Event::OrderCompleted(self.order_id));
            ORDER_COMPLETIONS.inc();
        }
        info!(
            old_status = %old_status,
            deduction_applied,
            "reseller order status updated"
        );

        Ok(UpdateOrderStatusResult {
            order_id: self.order_id,
            old_status,
            new_status: self.new_status,
            deduction_applied,
        })
    }
}

fn not_found(order_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("reseller order {} not found", order_id))
}
