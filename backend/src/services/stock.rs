//! Stock ledger service: the append-only event store
//!
//! Every inventory movement is one immutable row in `stock_logs`. Balances
//! are never stored; readers aggregate the log on demand, so the log is the
//! single source of truth for on-hand stock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::ledger::{self, Movement};
use shared::models::{Balance, NewStockEvent, StockEvent, StockEventType};
use shared::validation::{validate_corrected_quantity, validate_event_quantity};

use crate::error::{AppError, AppResult};

/// Stock ledger service for appending and scanning movement events
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Filters for scanning the ledger
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockScanFilter {
    pub event_type: Option<StockEventType>,
    pub entry_date: Option<NaiveDate>,
    pub outlet_id: Option<Uuid>,
    pub merchant_id: Option<Uuid>,
    /// Substring match on product name
    pub search: Option<String>,
}

/// Raw scan row with joined display columns
#[derive(Debug, FromRow)]
struct StockLogRow {
    id: Uuid,
    merchant_id: Uuid,
    product_id: Uuid,
    outlet_id: Uuid,
    quantity: i64,
    entry_date: NaiveDate,
    event_type: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    creator_name: Option<String>,
    merchant_name: Option<String>,
    outlet_name: Option<String>,
    product_name: Option<String>,
    sku: Option<String>,
    image_url: Option<String>,
}

/// A ledger entry flattened for presentation
#[derive(Debug, Clone, Serialize)]
pub struct StockLogView {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub event_type: StockEventType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub merchant_name: String,
    pub outlet_name: String,
    pub product_name: String,
    pub creator_name: String,
    pub sku: String,
    pub image_url: Option<String>,
}

/// Derived balances for one (product, outlet) group in a scan
#[derive(Debug, Clone, Serialize)]
pub struct GroupedStockView {
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub merchant_id: Uuid,
    pub product_name: String,
    pub outlet_name: String,
    pub merchant_name: String,
    pub sku: String,
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub balance: Balance,
}

/// Flatten a joined row into the presentation shape.
///
/// Missing joins fall back to placeholder names so a deleted catalog row
/// never hides its ledger history.
fn flatten_row(row: StockLogRow) -> AppResult<StockLogView> {
    let event_type = StockEventType::from_str(&row.event_type)
        .ok_or_else(|| AppError::Internal(format!("unknown stock event type: {}", row.event_type)))?;

    Ok(StockLogView {
        id: row.id,
        merchant_id: row.merchant_id,
        product_id: row.product_id,
        outlet_id: row.outlet_id,
        quantity: row.quantity,
        entry_date: row.entry_date,
        event_type,
        created_by: row.created_by,
        created_at: row.created_at,
        merchant_name: row.merchant_name.unwrap_or_else(|| "Unknown Merchant".to_string()),
        outlet_name: row.outlet_name.unwrap_or_else(|| "Unknown Outlet".to_string()),
        product_name: row.product_name.unwrap_or_else(|| "Unknown Product".to_string()),
        creator_name: row.creator_name.unwrap_or_else(|| "System".to_string()),
        sku: row.sku.unwrap_or_else(|| "-".to_string()),
        image_url: row.image_url,
    })
}

/// Map insert failures onto the caller-facing taxonomy: a broken reference
/// is the caller's mistake, not a store outage.
fn map_insert_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => {
                return AppError::ValidationError(
                    "unknown merchant, outlet, product, or actor reference".to_string(),
                )
            }
            Some("23514") => {
                return AppError::ValidationError("quantity violates ledger constraints".to_string())
            }
            _ => {}
        }
    }
    AppError::DatabaseError(err)
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append a batch of events to the ledger, all-or-nothing.
    pub async fn append(&self, events: Vec<NewStockEvent>) -> AppResult<Vec<StockEvent>> {
        if events.is_empty() {
            return Err(AppError::ValidationError("no events to append".to_string()));
        }

        for event in &events {
            validate_event_quantity(event.event_type, event.quantity).map_err(|msg| {
                AppError::Validation {
                    field: "quantity".to_string(),
                    message: msg.to_string(),
                    message_id: "Jumlah tidak valid".to_string(),
                }
            })?;

            if event.created_by.is_nil() {
                return Err(AppError::Unauthorized {
                    message: "Event actor is not authenticated".to_string(),
                    message_id: "Pengguna belum terautentikasi".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;
        let mut written = Vec::with_capacity(events.len());

        for event in events {
            let row = sqlx::query_as::<_, EventRow>(
                r#"
                INSERT INTO stock_logs (merchant_id, outlet_id, product_id, quantity, entry_date, type, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, merchant_id, outlet_id, product_id, quantity, entry_date,
                          type AS event_type, created_by, created_at
                "#,
            )
            .bind(event.merchant_id)
            .bind(event.outlet_id)
            .bind(event.product_id)
            .bind(event.quantity)
            .bind(event.entry_date)
            .bind(event.event_type.as_str())
            .bind(event.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_insert_error)?;

            written.push(row.into_event()?);
        }

        tx.commit().await?;

        Ok(written)
    }

    /// Scan the ledger newest-first with optional filters, returning the
    /// flattened rows and the exact total for pagination.
    pub async fn scan(&self, filter: &StockScanFilter) -> AppResult<(Vec<StockLogView>, u64)> {
        let event_type = filter.event_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, StockLogRow>(
            r#"
            SELECT sl.id, sl.merchant_id, sl.product_id, sl.outlet_id, sl.quantity, sl.entry_date,
                   sl.type AS event_type, sl.created_by, sl.created_at,
                   p.fullname AS creator_name,
                   m.name AS merchant_name,
                   o.name AS outlet_name,
                   pr.name AS product_name,
                   pr.sku, pr.image_url
            FROM stock_logs sl
            LEFT JOIN profiles p ON p.id = sl.created_by
            LEFT JOIN merchants m ON m.id = sl.merchant_id
            LEFT JOIN outlets o ON o.id = sl.outlet_id
            LEFT JOIN products pr ON pr.id = sl.product_id
            WHERE ($1::text IS NULL OR sl.type = $1)
              AND ($2::date IS NULL OR sl.entry_date = $2)
              AND ($3::uuid IS NULL OR sl.outlet_id = $3)
              AND ($4::uuid IS NULL OR sl.merchant_id = $4)
              AND ($5::text IS NULL OR pr.name ILIKE '%' || $5 || '%')
            ORDER BY sl.created_at DESC
            "#,
        )
        .bind(event_type)
        .bind(filter.entry_date)
        .bind(filter.outlet_id)
        .bind(filter.merchant_id)
        .bind(filter.search.as_deref())
        .fetch_all(&self.db)
        .await?;

        let total = rows.len() as u64;
        let views = rows.into_iter().map(flatten_row).collect::<AppResult<Vec<_>>>()?;

        Ok((views, total))
    }

    /// Scan and reduce to per-(product, outlet) balances.
    ///
    /// This is the single aggregation path for grouped stock reads; the
    /// settlement worklist shares the same reduction over its own window.
    pub async fn scan_grouped(&self, filter: &StockScanFilter) -> AppResult<Vec<GroupedStockView>> {
        let (events, _) = self.scan(filter).await?;

        let balances = ledger::aggregate(events.iter().map(|e| Movement {
            product_id: e.product_id,
            outlet_id: e.outlet_id,
            event_type: e.event_type,
            quantity: e.quantity,
        }));

        // Carry display fields from the first event seen per group; the scan
        // is newest-first so this is the latest movement.
        let mut grouped = Vec::with_capacity(balances.len());
        let mut seen: std::collections::HashSet<(Uuid, Uuid)> = std::collections::HashSet::new();

        for event in &events {
            if !seen.insert((event.product_id, event.outlet_id)) {
                continue;
            }
            let key = shared::models::BalanceKey {
                product_id: event.product_id,
                outlet_id: event.outlet_id,
            };
            let balance = balances.get(&key).copied().unwrap_or_default();
            grouped.push(GroupedStockView {
                product_id: event.product_id,
                outlet_id: event.outlet_id,
                merchant_id: event.merchant_id,
                product_name: event.product_name.clone(),
                outlet_name: event.outlet_name.clone(),
                merchant_name: event.merchant_name.clone(),
                sku: event.sku.clone(),
                image_url: event.image_url.clone(),
                balance,
            });
        }

        Ok(grouped)
    }

    /// Correct the quantity of an existing event.
    ///
    /// The workflow layer restricts corrections to IN rows; at this layer
    /// only existence and positivity are enforced.
    pub async fn update_quantity(&self, id: Uuid, quantity: i64) -> AppResult<()> {
        validate_corrected_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
            message_id: "Jumlah tidak valid".to_string(),
        })?;

        let result = sqlx::query("UPDATE stock_logs SET quantity = $1 WHERE id = $2")
            .bind(quantity)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock event".to_string()));
        }

        Ok(())
    }

    /// Hard-delete an event by id (staff correction only).
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stock_logs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock event".to_string()));
        }

        Ok(())
    }
}

/// Minimal row for reading back inserted events
#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    merchant_id: Uuid,
    outlet_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    entry_date: NaiveDate,
    event_type: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> AppResult<StockEvent> {
        let event_type = StockEventType::from_str(&self.event_type).ok_or_else(|| {
            AppError::Internal(format!("unknown stock event type: {}", self.event_type))
        })?;

        Ok(StockEvent {
            id: self.id,
            merchant_id: self.merchant_id,
            outlet_id: self.outlet_id,
            product_id: self.product_id,
            quantity: self.quantity,
            entry_date: self.entry_date,
            event_type,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(event_type: &str) -> StockLogRow {
        StockLogRow {
            id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            outlet_id: Uuid::new_v4(),
            quantity: 5,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            event_type: event_type.to_string(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            creator_name: None,
            merchant_name: Some("Dapur Manis".to_string()),
            outlet_name: None,
            product_name: Some("Klepon".to_string()),
            sku: Some("KLP-001".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn test_flatten_row_fills_placeholders() {
        let view = flatten_row(sample_row("IN")).unwrap();

        assert_eq!(view.event_type, StockEventType::In);
        assert_eq!(view.merchant_name, "Dapur Manis");
        assert_eq!(view.outlet_name, "Unknown Outlet");
        assert_eq!(view.creator_name, "System");
    }

    #[test]
    fn test_flatten_row_rejects_unknown_type() {
        assert!(flatten_row(sample_row("OUT_BROKEN")).is_err());
    }
}
