// Core models
pub mod inventory;
pub mod location;
pub mod reseller_order;
pub mod transfer_order;

pub use inventory::{SecondaryStockItem, StockItem};
pub use location::{BranchId, TransferDestination, WarehouseId};
pub use reseller_order::{ResellerOrder, ResellerOrderStatus};
pub use transfer_order::{TransferOrder, TransferOrderStatus};
