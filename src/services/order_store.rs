use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{ResellerOrder, TransferOrder},
    persistence::{collections, PersistenceAdapter},
};

/// In-memory mirror of the two order collections.
///
/// Primitive operations only: `apply` mutates the mirror, `persist` confirms
/// a record with the remote store, `remove` deletes remote-first. All
/// transition logic (including what to compensate when a persist fails)
/// lives in the fulfillment commands.
pub struct OrderStore {
    adapter: Arc<dyn PersistenceAdapter>,
    reseller: DashMap<Uuid, ResellerOrder>,
    transfers: DashMap<Uuid, TransferOrder>,
}

impl OrderStore {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            adapter,
            reseller: DashMap::new(),
            transfers: DashMap::new(),
        }
    }

    /// Hydrates both order mirrors. Same fallback policy as the ledger: a
    /// failed read logs and leaves the mirror empty.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<(), ServiceError> {
        self.reseller.clear();
        match self.adapter.list_all(collections::RESELLER_ORDERS).await {
            Ok(records) => {
                for record in records {
                    match serde_json::from_value::<ResellerOrder>(record) {
                        Ok(order) => {
                            self.reseller.insert(order.id, order);
                        }
                        Err(e) => warn!("skipping malformed reseller order: {}", e),
                    }
                }
                info!(rows = self.reseller.len(), "reseller orders hydrated");
            }
            Err(e) => error!("reseller order hydration failed, starting empty: {}", e),
        }

        self.transfers.clear();
        match self.adapter.list_all(collections::TRANSFER_ORDERS).await {
            Ok(records) => {
                for record in records {
                    match serde_json::from_value::<TransferOrder>(record) {
                        Ok(order) => {
                            self.transfers.insert(order.id, order);
                        }
                        Err(e) => warn!("skipping malformed transfer order: {}", e),
                    }
                }
                info!(rows = self.transfers.len(), "transfer orders hydrated");
            }
            Err(e) => error!("transfer order hydration failed, starting empty: {}", e),
        }

        Ok(())
    }

    pub fn reseller_order(&self, id: Uuid) -> Option<ResellerOrder> {
        self.reseller.get(&id).map(|entry| entry.value().clone())
    }

    pub fn transfer_order(&self, id: Uuid) -> Option<TransferOrder> {
        self.transfers.get(&id).map(|entry| entry.value().clone())
    }

    /// Optimistic in-memory write. Pair with `persist` and restore the prior
    /// snapshot if the persist fails.
    pub fn apply_reseller(&self, order: ResellerOrder) {
        self.reseller.insert(order.id, order);
    }

    pub fn apply_transfer(&self, order: TransferOrder) {
        self.transfers.insert(order.id, order);
    }

    pub fn discard_reseller(&self, id: Uuid) {
        self.reseller.remove(&id);
    }

    pub fn discard_transfer(&self, id: Uuid) {
        self.transfers.remove(&id);
    }

    pub async fn persist_reseller(&self, order: &ResellerOrder) -> Result<(), ServiceError> {
        let record: Value =
            serde_json::to_value(order).map_err(crate::errors::PersistenceError::from)?;
        self.adapter
            .upsert(collections::RESELLER_ORDERS, &order.id.to_string(), record)
            .await?;
        Ok(())
    }

    pub async fn persist_transfer(&self, order: &TransferOrder) -> Result<(), ServiceError> {
        let record: Value =
            serde_json::to_value(order).map_err(crate::errors::PersistenceError::from)?;
        self.adapter
            .upsert(collections::TRANSFER_ORDERS, &order.id.to_string(), record)
            .await?;
        Ok(())
    }

    /// Remote delete first; the mirror entry goes only once the remote
    /// confirmed.
    pub async fn remove_reseller(&self, id: Uuid) -> Result<(), ServiceError> {
        self.adapter
            .delete(collections::RESELLER_ORDERS, &id.to_string())
            .await?;
        self.reseller.remove(&id);
        Ok(())
    }

    pub async fn remove_transfer(&self, id: Uuid) -> Result<(), ServiceError> {
        self.adapter
            .delete(collections::TRANSFER_ORDERS, &id.to_string())
            .await?;
        self.transfers.remove(&id);
        Ok(())
    }

    pub fn reseller_count(&self) -> usize {
        self.reseller.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }
}
