//! Route definitions for the Titipan Back-Office

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // POS sale webhook (public - authenticated by HMAC signature)
        .route("/webhook/pos-sale", post(handlers::handle_pos_sale_webhook))
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - consignment settlement
        .nest("/settlement", settlement_routes())
        // Protected routes - catalog
        .nest("/merchants", merchant_routes())
        .nest("/outlets", outlet_routes())
        .nest("/products", product_routes())
        // Protected routes - blob storage
        .nest("/storage", storage_routes())
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/grouped", get(handlers::list_stock_grouped))
        .route("/eligibility", get(handlers::check_entry_eligibility))
        .route("/bulk", post(handlers::submit_bulk_stock))
        .route(
            "/:event_id",
            patch(handlers::correct_stock_entry).delete(handlers::delete_stock_entry),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Settlement routes (protected)
fn settlement_routes() -> Router<AppState> {
    Router::new()
        .route("/worklist", get(handlers::get_worklist))
        .route("/settle", post(handlers::settle_line))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Merchant catalog routes (protected)
fn merchant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_merchants).post(handlers::create_merchant))
        .route(
            "/:merchant_id",
            get(handlers::get_merchant).put(handlers::update_merchant),
        )
        .route("/:merchant_id/status", put(handlers::toggle_merchant_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Outlet catalog routes (protected)
fn outlet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_outlets).post(handlers::create_outlet))
        .route(
            "/:outlet_id",
            get(handlers::get_outlet).put(handlers::update_outlet),
        )
        .route("/:outlet_id/status", put(handlers::toggle_outlet_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route("/:product_id/status", put(handlers::toggle_product_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Blob storage routes (protected)
fn storage_routes() -> Router<AppState> {
    Router::new()
        .route("/images", post(handlers::upload_image))
        .route("/delete", post(handlers::delete_object))
        .route_layer(middleware::from_fn(auth_middleware))
}
