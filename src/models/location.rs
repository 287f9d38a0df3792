use serde::{Deserialize, Serialize};
use std::fmt;

/// A location whose stock is tracked in the ledger. Closed set: there are
/// exactly two warehouses, everything else is a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WarehouseId {
    Primary,
    Secondary,
}

impl WarehouseId {
    /// Persisted-store label. Historical records use these exact strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseId::Primary => "primary warehouse",
            WarehouseId::Secondary => "secondary warehouse",
        }
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for WarehouseId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "primary warehouse" => Ok(WarehouseId::Primary),
            "secondary warehouse" => Ok(WarehouseId::Secondary),
            other => Err(format!("not a tracked warehouse: {}", other)),
        }
    }
}

impl From<WarehouseId> for String {
    fn from(value: WarehouseId) -> Self {
        value.as_str().to_string()
    }
}

/// A sales/delivery endpoint with no tracked inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub String);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a transfer order delivers to. Branches are valid destinations but
/// carry no ledger entries, so crediting one is a non-case by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransferDestination {
    Warehouse(WarehouseId),
    Branch(BranchId),
}

impl TransferDestination {
    pub fn tracked_warehouse(&self) -> Option<WarehouseId> {
        match self {
            TransferDestination::Warehouse(id) => Some(*id),
            TransferDestination::Branch(_) => None,
        }
    }
}

impl fmt::Display for TransferDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDestination::Warehouse(id) => id.fmt(f),
            TransferDestination::Branch(id) => id.fmt(f),
        }
    }
}

impl From<String> for TransferDestination {
    fn from(value: String) -> Self {
        match WarehouseId::try_from(value.clone()) {
            Ok(id) => TransferDestination::Warehouse(id),
            Err(_) => TransferDestination::Branch(BranchId(value)),
        }
    }
}

impl From<TransferDestination> for String {
    fn from(value: TransferDestination) -> Self {
        value.to_string()
    }
}
