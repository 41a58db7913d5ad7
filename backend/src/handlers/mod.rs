//! HTTP handlers for the Titipan Back-Office

pub mod health;
pub mod merchant;
pub mod outlet;
pub mod product;
pub mod settlement;
pub mod stock;
pub mod storage;
pub mod transaction;

pub use health::health_check;
pub use merchant::{
    create_merchant, get_merchant, list_merchants, toggle_merchant_status, update_merchant,
};
pub use outlet::{create_outlet, get_outlet, list_outlets, toggle_outlet_status, update_outlet};
pub use product::{
    create_product, get_product, list_products, toggle_product_status, update_product,
};
pub use settlement::{get_worklist, settle_line};
pub use stock::{
    check_entry_eligibility, correct_stock_entry, delete_stock_entry, list_stock,
    list_stock_grouped, submit_bulk_stock,
};
pub use storage::{delete_object, upload_image};
pub use transaction::handle_pos_sale_webhook;
