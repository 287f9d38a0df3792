use dashmap::DashMap;
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{SecondaryStockItem, StockItem, WarehouseId},
    persistence::{collections, PersistenceAdapter},
};

lazy_static! {
    static ref STOCK_ADJUSTMENTS: IntCounter = IntCounter::new(
        "stock_adjustments_total",
        "Total number of confirmed stock ledger adjustments"
    )
    .expect("metric can be created");
    static ref STOCK_ADJUSTMENT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "stock_adjustment_failures_total",
            "Total number of failed stock ledger adjustments"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Catalog fallback used when primary-inventory hydration fails. Keeps the
/// ledger operable (at zero quantity) instead of blocking startup.
const SEED_CATALOG: &[(&str, &str, &str)] = &[
    ("FG-COLA-330", "Cola 330ml can", "case"),
    ("FG-LEMON-330", "Lemon soda 330ml can", "case"),
    ("FG-WATER-500", "Still water 500ml bottle", "case"),
];

/// Addresses one ledger row. Primary rows are keyed by SKU, secondary rows
/// by surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    Primary(String),
    Secondary(Uuid),
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKey::Primary(sku) => write!(f, "{}/{}", WarehouseId::Primary, sku),
            LedgerKey::Secondary(id) => write!(f, "{}/{}", WarehouseId::Secondary, id),
        }
    }
}

/// Per-location stock ledger.
///
/// Owns the canonical in-memory mirror of both warehouse collections,
/// hydrated from the persisted store at startup. All mutation goes through
/// [`StockLedger::adjust`], which confirms the remote write before touching
/// the mirror; a rejected write leaves the mirror untouched and surfaces the
/// error to the caller.
pub struct StockLedger {
    adapter: Arc<dyn PersistenceAdapter>,
    primary: DashMap<String, StockItem>,
    secondary: DashMap<Uuid, SecondaryStockItem>,
}

impl StockLedger {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            adapter,
            primary: DashMap::new(),
            secondary: DashMap::new(),
        }
    }

    /// Hydrates both warehouse mirrors. A failed read is logged and falls
    /// back to the seed catalog (primary) or an empty set (secondary);
    /// hydration never blocks startup.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<(), ServiceError> {
        self.primary.clear();
        match self.adapter.list_all(collections::INVENTORY).await {
            Ok(records) => {
                for record in records {
                    match serde_json::from_value::<StockItem>(record) {
                        Ok(item) => {
                            self.primary.insert(item.sku.clone(), item);
                        }
                        Err(e) => warn!("skipping malformed inventory record: {}", e),
                    }
                }
                info!(rows = self.primary.len(), "primary inventory hydrated");
            }
            Err(e) => {
                error!("primary inventory hydration failed, seeding catalog: {}", e);
                for (sku, description, uom) in SEED_CATALOG {
                    self.primary.insert(
                        sku.to_string(),
                        StockItem {
                            sku: sku.to_string(),
                            quantity: 0,
                            description: description.to_string(),
                            uom: uom.to_string(),
                        },
                    );
                }
            }
        }

        self.secondary.clear();
        match self.adapter.list_all(collections::SECONDARY_INVENTORY).await {
            Ok(records) => {
                for record in records {
                    match serde_json::from_value::<SecondaryStockItem>(record) {
                        Ok(item) => {
                            self.secondary.insert(item.id, item);
                        }
                        Err(e) => warn!("skipping malformed secondary inventory record: {}", e),
                    }
                }
                info!(rows = self.secondary.len(), "secondary inventory hydrated");
            }
            Err(e) => {
                error!("secondary inventory hydration failed, starting empty: {}", e);
            }
        }

        Ok(())
    }

    /// Current mirrored quantity for a ledger row, if the row exists.
    pub fn quantity(&self, key: &LedgerKey) -> Option<i32> {
        match key {
            LedgerKey::Primary(sku) => self.primary.get(sku).map(|item| item.quantity),
            LedgerKey::Secondary(id) => self.secondary.get(id).map(|item| item.quantity),
        }
    }

    /// Catalog description for a primary SKU (document generation input).
    pub fn description(&self, sku: &str) -> Option<String> {
        self.primary.get(sku).map(|item| item.description.clone())
    }

    /// Applies `current + delta` to one ledger row and returns the new
    /// quantity. The remote write is issued first; the mirror is updated only
    /// once the write is confirmed. Negative results are allowed through --
    /// the system warns about overselling elsewhere rather than blocking it.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn adjust(&self, key: &LedgerKey, delta: i32) -> Result<i32, ServiceError> {
        match key {
            LedgerKey::Primary(sku) => {
                let mut item = self
                    .primary
                    .get(sku)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| {
                        STOCK_ADJUSTMENT_FAILURES
                            .with_label_values(&["not_found"])
                            .inc();
                        ServiceError::NotFound(format!("no primary stock row for SKU {}", sku))
                    })?;
                item.quantity += delta;

                self.adapter
                    .write_item(
                        collections::INVENTORY,
                        sku,
                        serde_json::to_value(&item).map_err(crate::errors::PersistenceError::from)?,
                    )
                    .await
                    .map_err(|e| {
                        STOCK_ADJUSTMENT_FAILURES
                            .with_label_values(&["write_rejected"])
                            .inc();
                        ServiceError::Persistence(e)
                    })?;

                let new_quantity = item.quantity;
                self.primary.insert(sku.clone(), item);
                STOCK_ADJUSTMENTS.inc();
                info!(delta, new_quantity, "primary stock adjusted");
                Ok(new_quantity)
            }
            LedgerKey::Secondary(id) => {
                let mut item = self
                    .secondary
                    .get(id)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| {
                        STOCK_ADJUSTMENT_FAILURES
                            .with_label_values(&["not_found"])
                            .inc();
                        ServiceError::NotFound(format!("no secondary stock row {}", id))
                    })?;
                item.quantity += delta;

                self.adapter
                    .write_item(
                        collections::SECONDARY_INVENTORY,
                        &id.to_string(),
                        serde_json::to_value(&item).map_err(crate::errors::PersistenceError::from)?,
                    )
                    .await
                    .map_err(|e| {
                        STOCK_ADJUSTMENT_FAILURES
                            .with_label_values(&["write_rejected"])
                            .inc();
                        ServiceError::Persistence(e)
                    })?;

                let new_quantity = item.quantity;
                self.secondary.insert(*id, item);
                STOCK_ADJUSTMENTS.inc();
                info!(delta, new_quantity, "secondary stock adjusted");
                Ok(new_quantity)
            }
        }
    }

    /// Two-stage resolver for secondary-warehouse line keys: first by SKU,
    /// then by "product_name-flavor" (flavor defaults to "Default" when the
    /// key carries no separator). Records predating SKU assignment only
    /// match the second stage. `None` is a first-class outcome; callers skip
    /// the line.
    pub fn resolve_secondary(&self, line_key: &str) -> Option<Uuid> {
        if let Some(entry) = self
            .secondary
            .iter()
            .find(|entry| entry.sku.as_deref() == Some(line_key))
        {
            return Some(entry.id);
        }

        let (name, flavor) = match line_key.rsplit_once('-') {
            Some((name, flavor)) => (name, flavor),
            None => (line_key, "Default"),
        };
        self.secondary
            .iter()
            .find(|entry| entry.product_name == name && entry.flavor == flavor)
            .map(|entry| entry.id)
    }

    /// Resolves a transfer line against one warehouse's ledger. Primary rows
    /// must exist under the line key as SKU; secondary rows go through the
    /// dual-key shim.
    pub fn resolve_line(&self, warehouse: WarehouseId, line_key: &str) -> Option<LedgerKey> {
        match warehouse {
            WarehouseId::Primary => self
                .primary
                .contains_key(line_key)
                .then(|| LedgerKey::Primary(line_key.to_string())),
            WarehouseId::Secondary => self
                .resolve_secondary(line_key)
                .map(LedgerKey::Secondary),
        }
    }

    /// Direct mirror insert for bootstrap paths that bypass hydration.
    pub fn load_primary(&self, item: StockItem) {
        self.primary.insert(item.sku.clone(), item);
    }

    pub fn load_secondary(&self, item: SecondaryStockItem) {
        self.secondary.insert(item.id, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryAdapter;

    fn ledger_with_secondary(items: Vec<SecondaryStockItem>) -> StockLedger {
        let ledger = StockLedger::new(Arc::new(MemoryAdapter::new()));
        for item in items {
            ledger.load_secondary(item);
        }
        ledger
    }

    fn secondary(sku: Option<&str>, name: &str, flavor: &str) -> SecondaryStockItem {
        SecondaryStockItem {
            id: Uuid::new_v4(),
            sku: sku.map(String::from),
            product_name: name.to_string(),
            flavor: flavor.to_string(),
            quantity: 0,
            unit: "case".to_string(),
        }
    }

    #[test]
    fn resolver_prefers_sku_match() {
        let by_sku = secondary(Some("FG-COLA-330"), "Cola", "Classic");
        let by_name = secondary(None, "FG", "COLA-330");
        let expected = by_sku.id;
        let ledger = ledger_with_secondary(vec![by_sku, by_name]);

        assert_eq!(ledger.resolve_secondary("FG-COLA-330"), Some(expected));
    }

    #[test]
    fn resolver_falls_back_to_name_and_flavor() {
        let legacy = secondary(None, "Cola", "Cherry");
        let expected = legacy.id;
        let ledger = ledger_with_secondary(vec![legacy]);

        assert_eq!(ledger.resolve_secondary("Cola-Cherry"), Some(expected));
        assert_eq!(ledger.resolve_secondary("Cola-Vanilla"), None);
    }

    #[test]
    fn resolver_defaults_flavor_when_key_has_no_separator() {
        let legacy = secondary(None, "Cola", "Default");
        let expected = legacy.id;
        let ledger = ledger_with_secondary(vec![legacy]);

        assert_eq!(ledger.resolve_secondary("Cola"), Some(expected));
    }

    #[tokio::test]
    async fn adjust_allows_negative_quantities() {
        let adapter = Arc::new(MemoryAdapter::new());
        let ledger = StockLedger::new(adapter);
        ledger.load_primary(StockItem {
            sku: "X".to_string(),
            quantity: 2,
            description: String::new(),
            uom: String::new(),
        });

        let new_quantity = ledger
            .adjust(&LedgerKey::Primary("X".to_string()), -5)
            .await
            .unwrap();
        assert_eq!(new_quantity, -3);
        assert_eq!(ledger.quantity(&LedgerKey::Primary("X".to_string())), Some(-3));
    }

    #[tokio::test]
    async fn adjust_unknown_sku_is_not_found() {
        let ledger = StockLedger::new(Arc::new(MemoryAdapter::new()));
        let err = ledger
            .adjust(&LedgerKey::Primary("MISSING".to_string()), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
