use std::sync::Arc;
use tracing::instrument;

use crate::{
    commands::{
        orders::{
            AttachCoaCommand, AttachCoaResult, CreateResellerOrderCommand,
            CreateResellerOrderResult, DeleteOrderCommand, DeleteOrderResult,
            GeneratePackingListCommand, GeneratePackingListResult, UpdateOrderStatusCommand,
            UpdateOrderStatusResult,
        },
        Command,
    },
    errors::ServiceError,
    events::EventSender,
    models::ResellerOrder,
    CoreContext,
};

/// Service for managing reseller orders. Thin dispatch over the fulfillment
/// commands; UI handlers call this, never the commands directly.
#[derive(Clone)]
pub struct ResellerOrderService {
    ctx: Arc<CoreContext>,
    events: Arc<EventSender>,
}

impl ResellerOrderService {
    pub fn new(ctx: Arc<CoreContext>, events: Arc<EventSender>) -> Self {
        Self { ctx, events }
    }

    #[instrument(skip(self, command))]
    pub async fn create_order(
        &self,
        command: CreateResellerOrderCommand,
    ) -> Result<CreateResellerOrderResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        command: UpdateOrderStatusCommand,
    ) -> Result<UpdateOrderStatusResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_order(
        &self,
        command: DeleteOrderCommand,
    ) -> Result<DeleteOrderResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn generate_packing_list(
        &self,
        command: GeneratePackingListCommand,
    ) -> Result<GeneratePackingListResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self, command))]
    pub async fn attach_coa(
        &self,
        command: AttachCoaCommand,
    ) -> Result<AttachCoaResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    pub fn get_order(&self, id: uuid::Uuid) -> Option<ResellerOrder> {
        self.ctx.orders.reseller_order(id)
    }
}
