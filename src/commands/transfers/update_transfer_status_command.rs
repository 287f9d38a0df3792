use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{TransferOrder, TransferOrderStatus, WarehouseId},
    CoreContext,
};

lazy_static! {
    static ref TRANSFER_STATUS_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "transfer_status_failures_total",
            "Total number of failed transfer status updates"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Drives the transfer-order state machine. Effects by transition:
///
/// - entering `Completed`: credit the destination ledger per line, but only
///   when the destination is a tracked warehouse. Branch destinations are
///   delivery endpoints and get no credit.
/// - leaving `Completed`: undo the destination credit. The source deduction
///   stays in force unless the target status is `Cancelled` -- reversal and
///   cancellation are distinct operations.
/// - entering `Cancelled` while deducted: return quantity to the source and
///   clear `is_deducted`.
/// - leaving `Cancelled` to an active status while not deducted: re-deduct
///   the source and set `is_deducted`.
///
/// Transitions that run compensating stock effects require `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTransferStatusCommand {
    pub transfer_id: Uuid,
    pub new_status: TransferOrderStatus,
    /// Explicit user confirmation, required before compensating effects run.
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTransferStatusResult {
    pub transfer_id: Uuid,
    pub old_status: TransferOrderStatus,
    pub new_status: TransferOrderStatus,
    pub applied: bool,
}

#[async_trait::async_trait]
impl Command for UpdateTransferStatusCommand {
    type Result = UpdateTransferStatusResult;

    #[instrument(skip(self, ctx, events), fields(transfer_id = %self.transfer_id, new_status = %self.new_status))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let _guard = match ctx.locks.acquire(self.transfer_id) {
            Some(guard) => guard,
            None => {
                warn!("transfer already mid-transition; ignoring duplicate request");
                let current = ctx
                    .orders
                    .transfer_order(self.transfer_id)
                    .ok_or_else(|| not_found(self.transfer_id))?;
                return Ok(UpdateTransferStatusResult {
                    transfer_id: self.transfer_id,
                    old_status: current.status,
                    new_status: current.status,
                    applied: false,
                });
            }
        };

        let snapshot = ctx
            .orders
            .transfer_order(self.transfer_id)
            .ok_or_else(|| not_found(self.transfer_id))?;
        let old_status = snapshot.status;

        if old_status == self.new_status {
            return Ok(UpdateTransferStatusResult {
                transfer_id: self.transfer_id,
                old_status,
                new_status: old_status,
                applied: false,
            });
        }

        let entering_completed = self.new_status == TransferOrderStatus::Completed;
        let leaving_completed = old_status == TransferOrderStatus::Completed;
        let cancelling = self.new_status == TransferOrderStatus::Cancelled && snapshot.is_deducted;
        let reactivating = old_status == TransferOrderStatus::Cancelled
            && self.new_status.is_active()
            && !snapshot.is_deducted;

        if (leaving_completed || cancelling) && !self.confirmed {
            return Err(ServiceError::InvalidOperation(
                "this change reverses stock movements and requires explicit confirmation"
                    .to_string(),
            ));
        }

        let mut updated = snapshot.clone();
        updated.status = self.new_status;
        ctx.orders.apply_transfer(updated.clone());

        if entering_completed {
            if let Some(warehouse) = updated.destination.tracked_warehouse() {
                if let Err(e) = self
                    .apply_leg(&ctx, &events, &snapshot, warehouse, LegDirection::Credit)
                    .await
                {
                    ctx.orders.apply_transfer(snapshot);
                    return Err(e);
                }
            }
        }

        if leaving_completed {
            if let Some(warehouse) = updated.destination.tracked_warehouse() {
                if let Err(e) = self
                    .apply_leg(&ctx, &events, &snapshot, warehouse, LegDirection::Debit)
                    .await
                {
                    ctx.orders.apply_transfer(snapshot);
                    return Err(e);
                }
            }
        }

        if cancelling {
            if let Err(e) = self
                .apply_leg(
                    &ctx,
                    &events,
                    &snapshot,
                    snapshot.from_location,
                    LegDirection::Credit,
                )
                .await
            {
                ctx.orders.apply_transfer(snapshot);
                return Err(e);
            }
            updated.is_deducted = false;
            ctx.orders.apply_transfer(updated.clone());
        }

        if reactivating {
            if let Err(e) = self
                .apply_leg(
                    &ctx,
                    &events,
                    &snapshot,
                    snapshot.from_location,
                    LegDirection::Debit,
                )
                .await
            {
                ctx.orders.apply_transfer(snapshot);
                return Err(e);
            }
            updated.is_deducted = true;
            ctx.orders.apply_transfer(updated.clone());
        }

        if let Err(e) = ctx.orders.persist_transfer(&updated).await {
            TRANSFER_STATUS_FAILURES
                .with_label_values(&["persistence"])
                .inc();
            // Ledger legs already confirmed stay applied.
            ctx.orders.apply_transfer(snapshot);
            return Err(e);
        }

        events.emit(Event::TransferStatusChanged {
            transfer_id: self.transfer_id,
            old_status: old_status.to_string(),
            new_status: self.new_status.to_string(),
        });
        info!(old_status = %old_status, "transfer status updated");

        Ok(UpdateTransferStatusResult {
            transfer_id: self.transfer_id,
            old_status,
            new_status: self.new_status,
            applied: true,
        })
    }
}

enum LegDirection {
    Credit,
    Debit,
}

impl UpdateTransferStatusCommand {
    /// Adjusts every resolvable line of the order against one warehouse.
    /// Unresolvable lines are skipped with a warning; a rejected write
    /// aborts and surfaces to the caller.
    async fn apply_leg(
        &self,
        ctx: &CoreContext,
        events: &EventSender,
        order: &TransferOrder,
        warehouse: WarehouseId,
        direction: LegDirection,
    ) -> Result<(), ServiceError> {
        for (key, quantity) in &order.items {
            let delta = match direction {
                LegDirection::Credit => *quantity,
                LegDirection::Debit => -*quantity,
            };
            match ctx.ledger.resolve_line(warehouse, key) {
                Some(ledger_key) => {
                    let new_quantity =
                        ctx.ledger.adjust(&ledger_key, delta).await.map_err(|e| {
                            TRANSFER_STATUS_FAILURES
                                .with_label_values(&["ledger_write"])
                                .inc();
                            e
                        })?;
                    events.emit(Event::StockAdjusted {
                        key: key.clone(),
                        delta,
                        new_quantity,
                    });
                }
                None => warn!(
                    line = %key,
                    warehouse = %warehouse,
                    "transfer line does not resolve; skipping"
                ),
            }
        }
        Ok(())
    }
}

fn not_found(transfer_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("transfer order {} not found", transfer_id))
}
