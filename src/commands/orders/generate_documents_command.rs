use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    services::documents::DocumentLine,
    CoreContext,
};

/// Which order a packing list is generated for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PackingListTarget {
    Reseller(Uuid),
    Transfer(Uuid),
}

impl PackingListTarget {
    fn order_id(&self) -> Uuid {
        match self {
            PackingListTarget::Reseller(id) | PackingListTarget::Transfer(id) => *id,
        }
    }
}

/// Calls the document generator and records the packing-list flag on the
/// order. Purely consumer-side: nothing from the generated document flows
/// back into fulfillment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePackingListCommand {
    pub target: PackingListTarget,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePackingListResult {
    pub order_id: Uuid,
    pub url: String,
}

#[async_trait::async_trait]
impl Command for GeneratePackingListCommand {
    type Result = GeneratePackingListResult;

    #[instrument(skip(self, ctx, events))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let order_id = self.target.order_id();
        let url = match self.target {
            PackingListTarget::Reseller(id) => {
                let snapshot = ctx.orders.reseller_order(id).ok_or_else(|| {
                    ServiceError::NotFound(format!("reseller order {} not found", id))
                })?;
                let lines = document_lines(&ctx, &snapshot.items);
                let url = ctx.documents.packing_list(id, &lines).await?;

                let mut updated = snapshot.clone();
                updated.has_packing_list = true;
                ctx.orders.apply_reseller(updated.clone());
                if let Err(e) = ctx.orders.persist_reseller(&updated).await {
                    ctx.orders.apply_reseller(snapshot);
                    return Err(e);
                }
                url
            }
            PackingListTarget::Transfer(id) => {
                let snapshot = ctx.orders.transfer_order(id).ok_or_else(|| {
                    ServiceError::NotFound(format!("transfer order {} not found", id))
                })?;
                let lines = document_lines(&ctx, &snapshot.items);
                let url = ctx.documents.packing_list(id, &lines).await?;

                let mut updated = snapshot.clone();
                updated.has_packing_list = true;
                ctx.orders.apply_transfer(updated.clone());
                if let Err(e) = ctx.orders.persist_transfer(&updated).await {
                    ctx.orders.apply_transfer(snapshot);
                    return Err(e);
                }
                url
            }
        };

        events.emit(Event::DocumentGenerated {
            order_id,
            url: url.clone(),
        });
        info!(%order_id, "packing list generated");

        Ok(GeneratePackingListResult { order_id, url })
    }
}

/// Attaches certificate-of-analysis data to a reseller order and records the
/// generated document handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachCoaCommand {
    pub order_id: Uuid,
    pub coa_data: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttachCoaResult {
    pub order_id: Uuid,
    pub url: String,
}

#[async_trait::async_trait]
impl Command for AttachCoaCommand {
    type Result = AttachCoaResult;

    #[instrument(skip(self, ctx, events), fields(order_id = %self.order_id))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let snapshot = ctx.orders.reseller_order(self.order_id).ok_or_else(|| {
            ServiceError::NotFound(format!("reseller order {} not found", self.order_id))
        })?;

        let url = ctx
            .documents
            .certificate_of_analysis(self.order_id, &self.coa_data)
            .await?;

        let mut updated = snapshot.clone();
        updated.has_coa = true;
        updated.coa_data = Some(self.coa_data.clone());
        ctx.orders.apply_reseller(updated.clone());
        if let Err(e) = ctx.orders.persist_reseller(&updated).await {
            ctx.orders.apply_reseller(snapshot);
            return Err(e);
        }

        events.emit(Event::DocumentGenerated {
            order_id: self.order_id,
            url: url.clone(),
        });
        info!("certificate of analysis attached");

        Ok(AttachCoaResult {
            order_id: self.order_id,
            url,
        })
    }
}

fn document_lines(
    ctx: &CoreContext,
    items: &std::collections::BTreeMap<String, i32>,
) -> Vec<DocumentLine> {
    items
        .iter()
        .map(|(sku, quantity)| DocumentLine {
            sku: sku.clone(),
            description: ctx.ledger.description(sku).unwrap_or_default(),
            quantity: *quantity,
        })
        .collect()
}
