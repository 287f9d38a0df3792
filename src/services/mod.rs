pub mod documents;
pub mod order_store;
pub mod orders;
pub mod pricing;
pub mod processing;
pub mod stock_ledger;
pub mod transfers;

pub use documents::{DocumentGenerator, DocumentLine, NullDocumentGenerator};
pub use order_store::OrderStore;
pub use orders::ResellerOrderService;
pub use pricing::{PriceResolver, TablePriceResolver};
pub use processing::{ProcessingGuard, ProcessingLock};
pub use stock_ledger::{LedgerKey, StockLedger};
pub use transfers::TransferOrderService;
