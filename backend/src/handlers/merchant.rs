//! HTTP handlers for merchant catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::merchant::{CreateMerchantInput, MerchantService, MerchantView, UpdateMerchantInput};
use crate::AppState;

/// Query parameters for catalog listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(20),
        }
    }
}

/// Input for toggling the active flag
#[derive(Debug, Deserialize)]
pub struct ToggleActiveInput {
    pub is_active: bool,
}

/// List merchants
pub async fn list_merchants(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<MerchantView>>> {
    let service = MerchantService::new(state.db);
    let merchants = service
        .list(query.search.as_deref(), &query.pagination())
        .await?;
    Ok(Json(merchants))
}

/// Get a merchant by id
pub async fn get_merchant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<MerchantView>> {
    let service = MerchantService::new(state.db);
    let merchant = service.get(merchant_id).await?;
    Ok(Json(merchant))
}

/// Register a merchant (admin only)
pub async fn create_merchant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMerchantInput>,
) -> AppResult<Json<MerchantView>> {
    require_admin(&current_user.0)?;
    let service = MerchantService::new(state.db);
    let merchant = service.create(current_user.0.user_id, input).await?;
    Ok(Json(merchant))
}

/// Update a merchant (admin only)
pub async fn update_merchant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(merchant_id): Path<Uuid>,
    Json(input): Json<UpdateMerchantInput>,
) -> AppResult<Json<MerchantView>> {
    require_admin(&current_user.0)?;
    let service = MerchantService::new(state.db);
    let merchant = service.update(merchant_id, input).await?;
    Ok(Json(merchant))
}

/// Toggle a merchant's active flag (admin only)
pub async fn toggle_merchant_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(merchant_id): Path<Uuid>,
    Json(input): Json<ToggleActiveInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = MerchantService::new(state.db);
    service.toggle_active(merchant_id, input.is_active).await?;
    Ok(Json(()))
}
