use std::sync::Arc;
use tracing::instrument;

use crate::{
    commands::{
        transfers::{
            CreateTransferOrderCommand, CreateTransferOrderResult, DeleteTransferOrderCommand,
            DeleteTransferOrderResult, UpdateTransferStatusCommand, UpdateTransferStatusResult,
        },
        Command,
    },
    errors::ServiceError,
    events::EventSender,
    models::TransferOrder,
    CoreContext,
};

/// Service for managing inter-location transfer orders.
#[derive(Clone)]
pub struct TransferOrderService {
    ctx: Arc<CoreContext>,
    events: Arc<EventSender>,
}

impl TransferOrderService {
    pub fn new(ctx: Arc<CoreContext>, events: Arc<EventSender>) -> Self {
        Self { ctx, events }
    }

    #[instrument(skip(self, command))]
    pub async fn create_transfer(
        &self,
        command: CreateTransferOrderCommand,
    ) -> Result<CreateTransferOrderResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        command: UpdateTransferStatusCommand,
    ) -> Result<UpdateTransferStatusResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_transfer(
        &self,
        command: DeleteTransferOrderCommand,
    ) -> Result<DeleteTransferOrderResult, ServiceError> {
        command
            .execute(self.ctx.clone(), self.events.clone())
            .await
    }

    pub fn get_transfer(&self, id: uuid::Uuid) -> Option<TransferOrder> {
        self.ctx.orders.transfer_order(id)
    }
}
