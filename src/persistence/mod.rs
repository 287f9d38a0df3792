//! Synchronization boundary with the remote persisted store.
//!
//! Every effect the core produces goes through this adapter as independent
//! single-key writes; there are no multi-key transactions. The in-memory
//! mirrors owned by the services are updated only after a write is confirmed.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::PersistenceError;

pub mod memory;

pub use memory::MemoryAdapter;

/// Persisted collection names. Schema-significant: historical records in
/// these collections predate this codebase.
pub mod collections {
    pub const INVENTORY: &str = "inventory";
    pub const SECONDARY_INVENTORY: &str = "secondary_inventory";
    pub const RESELLER_ORDERS: &str = "reseller_orders";
    pub const TRANSFER_ORDERS: &str = "transfer_orders";
}

/// Capability set the core requires from the remote store.
///
/// `write_item` is the single-key op the stock ledger writes through;
/// `read_item` is the matching point read for hosts that bypass the mirrors;
/// `upsert`/`delete` are whole-record ops for the order collections;
/// `list_all` hydrates the in-memory mirrors at startup.
///
/// Note: `write_item` is a client-side read-modify-write from the caller's
/// perspective. Two sessions adjusting the same key can lose an update; a
/// server-side atomic increment would close that race but the remote store
/// does not offer one today.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn read_item(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, PersistenceError>;

    async fn write_item(
        &self,
        collection: &str,
        key: &str,
        value: Value,
    ) -> Result<(), PersistenceError>;

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: Value,
    ) -> Result<(), PersistenceError>;

    async fn delete(&self, collection: &str, key: &str) -> Result<(), PersistenceError>;

    async fn list_all(&self, collection: &str) -> Result<Vec<Value>, PersistenceError>;
}
