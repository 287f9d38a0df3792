use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    CoreContext,
};

/// Removes a transfer order. When the order's source deduction is in force,
/// the quantity is returned to the source warehouse first, so deleting an
/// open transfer never strands stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTransferOrderCommand {
    pub transfer_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTransferOrderResult {
    pub transfer_id: Uuid,
    pub deleted: bool,
    pub stock_returned: bool,
}

#[async_trait::async_trait]
impl Command for DeleteTransferOrderCommand {
    type Result = DeleteTransferOrderResult;

    #[instrument(skip(self, ctx, events), fields(transfer_id = %self.transfer_id))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let _guard = match ctx.locks.acquire(self.transfer_id) {
            Some(guard) => guard,
            None => {
                warn!("transfer mid-transition; ignoring delete request");
                return Ok(DeleteTransferOrderResult {
                    transfer_id: self.transfer_id,
                    deleted: false,
                    stock_returned: false,
                });
            }
        };

        let snapshot = ctx
            .orders
            .transfer_order(self.transfer_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("transfer order {} not found", self.transfer_id))
            })?;

        let mut stock_returned = false;
        if snapshot.is_deducted {
            for (key, quantity) in &snapshot.items {
                match ctx.ledger.resolve_line(snapshot.from_location, key) {
                    Some(ledger_key) => {
                        let new_quantity = ctx.ledger.adjust(&ledger_key, *quantity).await?;
                        events.emit(Event::StockAdjusted {
                            key: key.clone(),
                            delta: *quantity,
                            new_quantity,
                        });
                    }
                    None => warn!(
                        line = %key,
                        source = %snapshot.from_location,
                        "transfer line does not resolve; skipping return"
                    ),
                }
            }
            stock_returned = true;

            // Keep the durable flag truthful before the row goes away, so a
            // failed delete cannot leave a deducted-flagged order whose
            // stock was already returned.
            let mut updated = snapshot.clone();
            updated.is_deducted = false;
            ctx.orders.apply_transfer(updated.clone());
            if let Err(e) = ctx.orders.persist_transfer(&updated).await {
                ctx.orders.apply_transfer(snapshot);
                return Err(e);
            }
        }

        ctx.orders.remove_transfer(self.transfer_id).await?;
        events.emit(Event::TransferDeleted(self.transfer_id));
        info!(stock_returned, "transfer order deleted");

        Ok(DeleteTransferOrderResult {
            transfer_id: self.transfer_id,
            deleted: true,
            stock_returned,
        })
    }
}
