use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary-warehouse stock row, keyed by SKU. Created at catalog-seed time and
/// mutated only through the ledger's adjust operation. Quantity may go
/// negative transiently; overselling is warned about upstream, not blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub sku: String,
    pub quantity: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uom: String,
}

/// Secondary-warehouse stock row. Keyed by a surrogate id because
/// name+flavor is not guaranteed unique. `sku` is optional: records created
/// before SKU assignment carry none and are resolved by the name+flavor
/// fallback instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryStockItem {
    pub id: Uuid,
    #[serde(default)]
    pub sku: Option<String>,
    pub product_name: String,
    #[serde(default = "default_flavor")]
    pub flavor: String,
    pub quantity: i32,
    #[serde(default)]
    pub unit: String,
}

pub(crate) fn default_flavor() -> String {
    "Default".to_string()
}
