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

/// Removes a reseller order row. Deliberately performs no compensating stock
/// return, even for completed orders: reseller-order reversal is not part of
/// the business rules (only transfer orders reverse).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOrderCommand {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteOrderResult {
    pub order_id: Uuid,
    pub deleted: bool,
}

#[async_trait::async_trait]
impl Command for DeleteOrderCommand {
    type Result = DeleteOrderResult;

    #[instrument(skip(self, ctx, events), fields(order_id = %self.order_id))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let _guard = match ctx.locks.acquire(self.order_id) {
            Some(guard) => guard,
            None => {
                warn!("order mid-transition; ignoring delete request");
                return Ok(DeleteOrderResult {
                    order_id: self.order_id,
                    deleted: false,
                });
            }
        };

        if ctx.orders.reseller_order(self.order_id).is_none() {
            return Err(ServiceError::NotFound(format!(
                "reseller order {} not found",
                self.order_id
            )));
        }

        ctx.orders.remove_reseller(self.order_id).await?;
        events.emit(Event::OrderDeleted(self.order_id));
        info!("reseller order deleted");

        Ok(DeleteOrderResult {
            order_id: self.order_id,
            deleted: true,
        })
    }
}
