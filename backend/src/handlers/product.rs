//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::handlers::merchant::ToggleActiveInput;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::product::{CreateProductInput, ProductService, ProductView, UpdateProductInput};
use crate::AppState;

/// Query parameters for product listings
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub merchant_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List products with derived per-outlet stock
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<PaginatedResponse<ProductView>>> {
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let service = ProductService::new(state.db);
    let products = service
        .list(query.search.as_deref(), query.merchant_id, &pagination)
        .await?;
    Ok(Json(products))
}

/// Get a product by id with derived stock
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Create a product (admin only)
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductView>> {
    require_admin(&current_user.0)?;
    let service = ProductService::new(state.db);
    let product = service.create(current_user.0.user_id, input).await?;
    Ok(Json(product))
}

/// Update a product (admin only)
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductView>> {
    require_admin(&current_user.0)?;
    let service = ProductService::new(state.db);
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Toggle a product's active flag (admin only)
pub async fn toggle_product_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ToggleActiveInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = ProductService::new(state.db);
    service.toggle_active(product_id, input.is_active).await?;
    Ok(Json(()))
}
