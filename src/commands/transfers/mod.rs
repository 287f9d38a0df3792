pub mod create_transfer_order_command;
pub mod delete_transfer_order_command;
pub mod update_transfer_status_command;

pub use create_transfer_order_command::{CreateTransferOrderCommand, CreateTransferOrderResult};
pub use delete_transfer_order_command::{DeleteTransferOrderCommand, DeleteTransferOrderResult};
pub use update_transfer_status_command::{UpdateTransferStatusCommand, UpdateTransferStatusResult};
