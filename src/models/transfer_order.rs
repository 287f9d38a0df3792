use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::location::{TransferDestination, WarehouseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum TransferOrderStatus {
    Unread,
    Processing,
    #[serde(rename = "In Transit")]
    #[strum(serialize = "In Transit")]
    InTransit,
    Completed,
    Cancelled,
}

impl TransferOrderStatus {
    /// Active means the order's source deduction should be in force.
    pub fn is_active(&self) -> bool {
        !matches!(self, TransferOrderStatus::Cancelled)
    }
}

/// An inter-location stock movement. Unlike a reseller order, the source
/// deduction happens at creation time; reaching `Completed` only adds the
/// destination credit (and only when the destination is a tracked warehouse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOrder {
    pub id: Uuid,
    pub from_location: WarehouseId,
    pub destination: TransferDestination,
    /// Line key -> quantity. The key is a SKU for current records; legacy
    /// secondary-warehouse lines use "product_name-flavor".
    pub items: BTreeMap<String, i32>,
    pub total_amount: Decimal,
    pub status: TransferOrderStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_deducted: bool,
    #[serde(default)]
    pub has_packing_list: bool,
}

impl TransferOrder {
    pub fn new(
        from_location: WarehouseId,
        destination: TransferDestination,
        items: BTreeMap<String, i32>,
        total_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_location,
            destination,
            items,
            total_amount,
            status: TransferOrderStatus::Unread,
            date: Utc::now(),
            is_deducted: false,
            has_packing_list: false,
        }
    }
}
