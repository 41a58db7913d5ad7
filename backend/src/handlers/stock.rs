//! HTTP handlers for the stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::StockEventType;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{GroupedStockView, StockLogView, StockScanFilter, StockService};
use crate::services::stock_entry::{BulkStockEntryInput, EntryEligibility, StockEntryService};
use crate::AppState;

/// Query parameters for ledger scans
#[derive(Debug, Deserialize)]
pub struct StockListQuery {
    pub event_type: Option<StockEventType>,
    pub entry_date: Option<NaiveDate>,
    pub outlet_id: Option<Uuid>,
    pub merchant_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Query parameters for the eligibility check
#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub outlet_id: Uuid,
    pub merchant_id: Uuid,
}

/// Input for correcting an IN entry's quantity
#[derive(Debug, Deserialize)]
pub struct CorrectQuantityInput {
    pub quantity: i64,
}

/// List response with an exact total for pagination
#[derive(Debug, Serialize)]
pub struct StockListResponse {
    pub data: Vec<StockLogView>,
    pub total: u64,
}

/// Grouped balances response
#[derive(Debug, Serialize)]
pub struct GroupedStockResponse {
    pub data: Vec<GroupedStockView>,
    pub total: u64,
}

impl StockListQuery {
    fn into_filter(self, user: &CurrentUser) -> StockScanFilter {
        StockScanFilter {
            event_type: self.event_type,
            entry_date: self.entry_date,
            outlet_id: user.0.scoped_outlet(self.outlet_id),
            merchant_id: self.merchant_id,
            search: self.search,
        }
    }
}

/// Scan the ledger, newest first
pub async fn list_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StockListQuery>,
) -> AppResult<Json<StockListResponse>> {
    let service = StockService::new(state.db);
    let (data, total) = service.scan(&query.into_filter(&current_user)).await?;
    Ok(Json(StockListResponse { data, total }))
}

/// Scan the ledger and reduce to per-(product, outlet) balances
pub async fn list_stock_grouped(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StockListQuery>,
) -> AppResult<Json<GroupedStockResponse>> {
    let service = StockService::new(state.db);
    let data = service
        .scan_grouped(&query.into_filter(&current_user))
        .await?;
    let total = data.len() as u64;
    Ok(Json(GroupedStockResponse { data, total }))
}

/// Check whether stock-in is allowed for an (outlet, merchant) pair today
pub async fn check_entry_eligibility(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<EligibilityQuery>,
) -> AppResult<Json<EntryEligibility>> {
    let outlet_id = current_user
        .0
        .scoped_outlet(Some(query.outlet_id))
        .unwrap_or(query.outlet_id);
    let service = StockEntryService::new(state.db);
    let eligibility = service
        .check_eligibility(outlet_id, query.merchant_id)
        .await?;
    Ok(Json(eligibility))
}

/// Record one bulk intake session
pub async fn submit_bulk_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(mut input): Json<BulkStockEntryInput>,
) -> AppResult<Json<BulkStockResponse>> {
    if let Some(outlet_id) = current_user.0.scoped_outlet(Some(input.outlet_id)) {
        input.outlet_id = outlet_id;
    }
    let service = StockEntryService::new(state.db);
    let recorded = service.submit_bulk(current_user.0.user_id, input).await?;
    Ok(Json(BulkStockResponse { recorded }))
}

/// Response for a bulk intake session
#[derive(Debug, Serialize)]
pub struct BulkStockResponse {
    pub recorded: usize,
}

/// Correct the quantity of an IN entry
pub async fn correct_stock_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CorrectQuantityInput>,
) -> AppResult<Json<()>> {
    let service = StockEntryService::new(state.db);
    service.correct_entry(id, input.quantity).await?;
    Ok(Json(()))
}

/// Delete an IN entry recorded by mistake
pub async fn delete_stock_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = StockEntryService::new(state.db);
    service.delete_entry(id).await?;
    Ok(Json(()))
}
