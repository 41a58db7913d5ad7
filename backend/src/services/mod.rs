//! Business logic services for the Titipan Back-Office

pub mod merchant;
pub mod outlet;
pub mod product;
pub mod settlement;
pub mod stock;
pub mod stock_entry;
pub mod transaction;

pub use merchant::MerchantService;
pub use outlet::OutletService;
pub use product::ProductService;
pub use settlement::SettlementService;
pub use stock::StockService;
pub use stock_entry::StockEntryService;
pub use transaction::TransactionBridgeService;
