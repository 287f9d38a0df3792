use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::PersistenceError;

use super::PersistenceAdapter;

/// In-process adapter backing the same contract as the remote store. Used
/// for local wiring and as the base of the test fakes.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    collections: DashMap<String, BTreeMap<String, Value>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the adapter contract. Test/bootstrap
    /// helper only.
    pub fn seed(&self, collection: &str, key: &str, record: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryAdapter {
    async fn read_item(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, PersistenceError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|records| records.get(key).cloned()))
    }

    async fn write_item(
        &self,
        collection: &str,
        key: &str,
        value: Value,
    ) -> Result<(), PersistenceError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: Value,
    ) -> Result<(), PersistenceError> {
        self.write_item(collection, key, record).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), PersistenceError> {
        if let Some(mut records) = self.collections.get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<Value>, PersistenceError> {
        Ok(self
            .collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }
}
