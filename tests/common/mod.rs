#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use stockflow_core::{
    config::{AppConfig, PricingConfig},
    errors::PersistenceError,
    events::{Event, EventSender},
    persistence::{collections, PersistenceAdapter},
    services::{NullDocumentGenerator, TablePriceResolver},
    CoreContext,
};

/// Fake remote store. Records every adapter call in order and injects
/// failures per operation+collection, so tests can assert exact call
/// sequences and that mirrors are only mutated after confirmed writes.
pub struct RecordingAdapter {
    data: DashMap<String, BTreeMap<String, Value>>,
    calls: Mutex<Vec<String>>,
    fail_ops: Mutex<HashSet<String>>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            fail_ops: Mutex::new(HashSet::new()),
        }
    }

    pub fn seed(&self, collection: &str, key: &str, record: Value) {
        self.data
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
    }

    /// Makes every call of `op` against `collection` fail, e.g.
    /// `fail_on("upsert", collections::RESELLER_ORDERS)`.
    pub fn fail_on(&self, op: &str, collection: &str) {
        self.fail_ops
            .lock()
            .unwrap()
            .insert(format!("{}:{}", op, collection));
    }

    pub fn clear_failures(&self) {
        self.fail_ops.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn stored(&self, collection: &str, key: &str) -> Option<Value> {
        self.data
            .get(collection)
            .and_then(|records| records.get(key).cloned())
    }

    fn record(&self, op: &str, collection: &str, key: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}/{}", op, collection, key));
    }

    fn should_fail(&self, op: &str, collection: &str) -> bool {
        self.fail_ops
            .lock()
            .unwrap()
            .contains(&format!("{}:{}", op, collection))
    }
}

#[async_trait]
impl PersistenceAdapter for RecordingAdapter {
    async fn read_item(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, PersistenceError> {
        self.record("read_item", collection, key);
        if self.should_fail("read_item", collection) {
            return Err(PersistenceError::ReadFailed {
                collection: collection.to_string(),
                reason: "injected".to_string(),
            });
        }
        Ok(self.stored(collection, key))
    }

    async fn write_item(
        &self,
        collection: &str,
        key: &str,
        value: Value,
    ) -> Result<(), PersistenceError> {
        self.record("write_item", collection, key);
        if self.should_fail("write_item", collection) {
            return Err(PersistenceError::WriteRejected {
                collection: collection.to_string(),
                key: key.to_string(),
                reason: "injected".to_string(),
            });
        }
        self.seed(collection, key, value);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: Value,
    ) -> Result<(), PersistenceError> {
        self.record("upsert", collection, key);
        if self.should_fail("upsert", collection) {
            return Err(PersistenceError::WriteRejected {
                collection: collection.to_string(),
                key: key.to_string(),
                reason: "injected".to_string(),
            });
        }
        self.seed(collection, key, record);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), PersistenceError> {
        self.record("delete", collection, key);
        if self.should_fail("delete", collection) {
            return Err(PersistenceError::WriteRejected {
                collection: collection.to_string(),
                key: key.to_string(),
                reason: "injected".to_string(),
            });
        }
        if let Some(mut records) = self.data.get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<Value>, PersistenceError> {
        self.record("list_all", collection, "*");
        if self.should_fail("list_all", collection) {
            return Err(PersistenceError::ReadFailed {
                collection: collection.to_string(),
                reason: "injected".to_string(),
            });
        }
        Ok(self
            .data
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }
}

pub struct TestCore {
    pub ctx: Arc<CoreContext>,
    pub adapter: Arc<RecordingAdapter>,
    pub events: Arc<EventSender>,
    pub event_rx: mpsc::Receiver<Event>,
    /// Secondary record carrying SKU "X".
    pub secondary_x: Uuid,
    /// Legacy secondary record with no SKU: "Cola" / "Cherry".
    pub secondary_legacy: Uuid,
}

/// Standard fixture: primary X=10, Y=5; one SKU-carrying and one legacy
/// secondary record; zone minimums 100 (default) / 500 ("Zone A"); unit
/// prices X=50, Y=100.
pub async fn core_with_inventory() -> TestCore {
    let adapter = Arc::new(RecordingAdapter::new());
    seed_inventory(&adapter);

    let secondary_x = Uuid::new_v4();
    let secondary_legacy = Uuid::new_v4();
    adapter.seed(
        collections::SECONDARY_INVENTORY,
        &secondary_x.to_string(),
        json!({
            "id": secondary_x,
            "sku": "X",
            "product_name": "Cola",
            "flavor": "Classic",
            "quantity": 0,
            "unit": "case"
        }),
    );
    adapter.seed(
        collections::SECONDARY_INVENTORY,
        &secondary_legacy.to_string(),
        json!({
            "id": secondary_legacy,
            "product_name": "Cola",
            "flavor": "Cherry",
            "quantity": 7,
            "unit": "case"
        }),
    );

    let config = AppConfig {
        pricing: PricingConfig {
            default_minimum: dec!(100),
            zone_minimums: HashMap::from([("Zone A".to_string(), dec!(500))]),
        },
        ..AppConfig::default()
    };

    let pricing = Arc::new(TablePriceResolver::new(HashMap::from([
        ("X".to_string(), dec!(50)),
        ("Y".to_string(), dec!(100)),
    ])));

    let ctx = CoreContext::initialize(
        config,
        adapter.clone(),
        pricing,
        Arc::new(NullDocumentGenerator),
    )
    .await
    .expect("core initializes");

    let (tx, event_rx) = mpsc::channel(64);
    let events = Arc::new(EventSender::new(tx));

    TestCore {
        ctx,
        adapter,
        events,
        event_rx,
        secondary_x,
        secondary_legacy,
    }
}

pub fn seed_inventory(adapter: &RecordingAdapter) {
    adapter.seed(
        collections::INVENTORY,
        "X",
        json!({"sku": "X", "quantity": 10, "description": "Cola 330ml", "uom": "case"}),
    );
    adapter.seed(
        collections::INVENTORY,
        "Y",
        json!({"sku": "Y", "quantity": 5, "description": "Lemon 330ml", "uom": "case"}),
    );
}

pub fn primary_quantity(core: &TestCore, sku: &str) -> Option<i32> {
    core.ctx
        .ledger
        .quantity(&stockflow_core::services::LedgerKey::Primary(
            sku.to_string(),
        ))
}

pub fn secondary_quantity(core: &TestCore, id: Uuid) -> Option<i32> {
    core.ctx
        .ledger
        .quantity(&stockflow_core::services::LedgerKey::Secondary(id))
}
