//! stockflow-core
//!
//! Finished-goods stock ledger and order fulfillment core. Tracks stock in
//! two warehouses (plus non-tracked sale branches), drives reseller and
//! transfer orders through their status lifecycles, and keeps the ledger
//! consistent with a remote persisted store under optimistic local updates.
//! No HTTP/CLI surface: the core is exercised through in-process calls from
//! UI handlers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod persistence;
pub mod services;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::persistence::PersistenceAdapter;
use crate::services::{
    DocumentGenerator, OrderStore, PriceResolver, ProcessingLock, StockLedger,
};

/// Shared dependencies for the fulfillment commands: canonical in-memory
/// state, the persistence adapter behind it, and the external collaborators.
pub struct CoreContext {
    pub config: AppConfig,
    pub adapter: Arc<dyn PersistenceAdapter>,
    pub ledger: Arc<StockLedger>,
    pub orders: Arc<OrderStore>,
    pub locks: ProcessingLock,
    pub pricing: Arc<dyn PriceResolver>,
    pub documents: Arc<dyn DocumentGenerator>,
}

impl CoreContext {
    /// Builds the core services and hydrates the in-memory mirrors from the
    /// persisted store. Hydration read failures fall back per collection and
    /// never block startup.
    pub async fn initialize(
        config: AppConfig,
        adapter: Arc<dyn PersistenceAdapter>,
        pricing: Arc<dyn PriceResolver>,
        documents: Arc<dyn DocumentGenerator>,
    ) -> Result<Arc<Self>, ServiceError> {
        let ledger = Arc::new(StockLedger::new(adapter.clone()));
        ledger.hydrate().await?;

        let orders = Arc::new(OrderStore::new(adapter.clone()));
        orders.hydrate().await?;

        Ok(Arc::new(Self {
            config,
            adapter,
            ledger,
            orders,
            locks: ProcessingLock::new(),
            pricing,
            documents,
        }))
    }
}
