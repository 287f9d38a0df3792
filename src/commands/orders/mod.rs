pub mod create_reseller_order_command;
pub mod delete_order_command;
pub mod generate_documents_command;
pub mod update_order_status_command;

pub use create_reseller_order_command::{CreateResellerOrderCommand, CreateResellerOrderResult};
pub use delete_order_command::{DeleteOrderCommand, DeleteOrderResult};
pub use generate_documents_command::{
    AttachCoaCommand, AttachCoaResult, GeneratePackingListCommand, GeneratePackingListResult,
    PackingListTarget,
};
pub use update_order_status_command::{UpdateOrderStatusCommand, UpdateOrderStatusResult};
