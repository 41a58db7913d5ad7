//! HTTP handlers for outlet catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use shared::models::Outlet;
use shared::types::PaginatedResponse;

use crate::error::AppResult;
use crate::handlers::merchant::{ListQuery, ToggleActiveInput};
use crate::middleware::{require_admin, CurrentUser};
use crate::services::outlet::{CreateOutletInput, OutletService, UpdateOutletInput};
use crate::AppState;

/// List outlets
pub async fn list_outlets(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Outlet>>> {
    let service = OutletService::new(state.db);
    let outlets = service
        .list(query.search.as_deref(), &query.pagination())
        .await?;
    Ok(Json(outlets))
}

/// Get an outlet by id
pub async fn get_outlet(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(outlet_id): Path<Uuid>,
) -> AppResult<Json<Outlet>> {
    let service = OutletService::new(state.db);
    let outlet = service.get(outlet_id).await?;
    Ok(Json(outlet))
}

/// Create an outlet (admin only)
pub async fn create_outlet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOutletInput>,
) -> AppResult<Json<Outlet>> {
    require_admin(&current_user.0)?;
    let service = OutletService::new(state.db);
    let outlet = service.create(input).await?;
    Ok(Json(outlet))
}

/// Update an outlet (admin only)
pub async fn update_outlet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(outlet_id): Path<Uuid>,
    Json(input): Json<UpdateOutletInput>,
) -> AppResult<Json<Outlet>> {
    require_admin(&current_user.0)?;
    let service = OutletService::new(state.db);
    let outlet = service.update(outlet_id, input).await?;
    Ok(Json(outlet))
}

/// Toggle an outlet's active flag (admin only)
pub async fn toggle_outlet_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(outlet_id): Path<Uuid>,
    Json(input): Json<ToggleActiveInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = OutletService::new(state.db);
    service.toggle_active(outlet_id, input.is_active).await?;
    Ok(Json(()))
}
