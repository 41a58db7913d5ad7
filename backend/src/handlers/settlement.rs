//! HTTP handlers for consignment settlement endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{SettlementLine, StockEvent};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::settlement::{SettleInput, SettlementService};
use crate::AppState;

/// Query parameters for the settlement worklist
#[derive(Debug, Deserialize)]
pub struct WorklistQuery {
    pub outlet_id: Uuid,
    pub merchant_id: Uuid,
}

/// Worklist response with the line count
#[derive(Debug, Serialize)]
pub struct WorklistResponse {
    pub data: Vec<SettlementLine>,
    pub total: usize,
}

/// Compute the open-window worklist for an (outlet, merchant) pair
pub async fn get_worklist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WorklistQuery>,
) -> AppResult<Json<WorklistResponse>> {
    let outlet_id = current_user
        .0
        .scoped_outlet(Some(query.outlet_id))
        .unwrap_or(query.outlet_id);
    let service = SettlementService::new(state.db);
    let data = service.worklist(query.merchant_id, outlet_id).await?;
    let total = data.len();
    Ok(Json(WorklistResponse { data, total }))
}

/// Settle one worklist line, closing its window
pub async fn settle_line(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(mut input): Json<SettleInput>,
) -> AppResult<Json<StockEvent>> {
    if let Some(outlet_id) = current_user.0.scoped_outlet(Some(input.outlet_id)) {
        input.outlet_id = outlet_id;
    }
    let service = SettlementService::new(state.db);
    let event = service.settle(current_user.0.user_id, input).await?;
    Ok(Json(event))
}
