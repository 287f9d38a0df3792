use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Status of a reseller sales order. `Processing` was historically stored as
/// "Read" in some records, kept as a deserialization alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ResellerOrderStatus {
    Unread,
    #[serde(alias = "Read")]
    Processing,
    Completed,
    Cancelled,
}

/// A sales order against a reseller zone. Deducts primary-warehouse stock
/// only on reaching `Completed`; `is_deducted` records whether that forward
/// effect is currently applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResellerOrder {
    pub id: Uuid,
    pub reseller_id: String,
    pub reseller_name: String,
    /// Zone/category label used for pricing, not a physical location.
    pub location: String,
    /// SKU -> quantity. Insertion order is irrelevant.
    pub items: BTreeMap<String, i32>,
    pub total_amount: Decimal,
    pub status: ResellerOrderStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_deducted: bool,
    #[serde(default)]
    pub has_packing_list: bool,
    #[serde(default)]
    pub has_coa: bool,
    #[serde(default)]
    pub coa_data: Option<serde_json::Value>,
}

impl ResellerOrder {
    pub fn new(
        reseller_id: String,
        reseller_name: String,
        location: String,
        items: BTreeMap<String, i32>,
        total_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reseller_id,
            reseller_name,
            location,
            items,
            total_amount,
            status: ResellerOrderStatus::Unread,
            date: Utc::now(),
            is_deducted: false,
            has_packing_list: false,
            has_coa: false,
            coa_data: None,
        }
    }
}
