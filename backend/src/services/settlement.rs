//! Consignment settlement engine
//!
//! A settlement window for a (merchant, outlet) pair opens strictly after
//! the pair's most recent OUT_SETTLE entry date and runs to now. Settling a
//! line writes one OUT_SETTLE event for the remaining stock, which becomes
//! the next window boundary, and the cycle repeats indefinitely.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::ledger::{self, Movement};
use shared::models::{NewStockEvent, SettlementLine, StockEvent, StockEventType};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// Settlement service for computing and closing consignment windows
#[derive(Clone)]
pub struct SettlementService {
    db: PgPool,
}

/// Input for settling one worklist line
#[derive(Debug, Deserialize)]
pub struct SettleInput {
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub merchant_id: Uuid,
    /// The stock the caller saw on its worklist snapshot, for audit logging
    /// only; the settled quantity is always re-derived from fresh data.
    pub expected_stock: Option<i64>,
}

/// Raw ledger row inside an open window
#[derive(Debug, FromRow)]
struct WindowRow {
    product_id: Uuid,
    quantity: i64,
    event_type: String,
    entry_date: NaiveDate,
    product_name: Option<String>,
    sku: Option<String>,
    image_url: Option<String>,
    selling_price: Option<Decimal>,
    merchant_name: Option<String>,
}

impl SettlementService {
    /// Create a new SettlementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Start of the open window: the most recent OUT_SETTLE entry date for
    /// the pair, or None when the window is open from the beginning.
    pub async fn window_start(
        &self,
        merchant_id: Uuid,
        outlet_id: Uuid,
    ) -> AppResult<Option<NaiveDate>> {
        let start = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT MAX(entry_date) FROM stock_logs
            WHERE merchant_id = $1 AND outlet_id = $2 AND type = 'OUT_SETTLE'
            "#,
        )
        .bind(merchant_id)
        .bind(outlet_id)
        .fetch_one(&self.db)
        .await?;

        Ok(start)
    }

    /// Compute the worklist of unsettled positive balances for the pair.
    ///
    /// Events on the window boundary itself are excluded (strict `>`), so a
    /// settlement day is never counted twice. Lines at zero or below are
    /// already reconciled and omitted.
    pub async fn worklist(
        &self,
        merchant_id: Uuid,
        outlet_id: Uuid,
    ) -> AppResult<Vec<SettlementLine>> {
        let window_start = self.window_start(merchant_id, outlet_id).await?;

        let rows = sqlx::query_as::<_, WindowRow>(
            r#"
            SELECT sl.product_id, sl.quantity, sl.type AS event_type, sl.entry_date,
                   pr.name AS product_name, pr.sku, pr.image_url, pr.selling_price,
                   m.name AS merchant_name
            FROM stock_logs sl
            LEFT JOIN products pr ON pr.id = sl.product_id
            LEFT JOIN merchants m ON m.id = sl.merchant_id
            WHERE sl.merchant_id = $1 AND sl.outlet_id = $2
              AND ($3::date IS NULL OR sl.entry_date > $3)
            ORDER BY sl.entry_date ASC, sl.created_at ASC
            "#,
        )
        .bind(merchant_id)
        .bind(outlet_id)
        .bind(window_start)
        .fetch_all(&self.db)
        .await?;

        let movements = rows
            .iter()
            .map(|row| {
                let event_type = StockEventType::from_str(&row.event_type).ok_or_else(|| {
                    AppError::Internal(format!("unknown stock event type: {}", row.event_type))
                })?;
                Ok(Movement {
                    product_id: row.product_id,
                    outlet_id,
                    event_type,
                    quantity: row.quantity,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let balances = ledger::aggregate(movements);

        // One line per product, display fields from its first movement in
        // the window; internal accumulators stay out of the response.
        let mut lines = Vec::new();
        let mut seen: std::collections::HashSet<Uuid> = std::collections::HashSet::new();

        for row in &rows {
            if !seen.insert(row.product_id) {
                continue;
            }
            let key = shared::models::BalanceKey {
                product_id: row.product_id,
                outlet_id,
            };
            let balance = balances.get(&key).copied().unwrap_or_default();
            if balance.current_stock <= 0 {
                continue;
            }
            lines.push(SettlementLine {
                product_id: row.product_id,
                outlet_id,
                merchant_id,
                product_name: row
                    .product_name
                    .clone()
                    .unwrap_or_else(|| "Unknown Product".to_string()),
                sku: row.sku.clone().unwrap_or_else(|| "-".to_string()),
                image_url: row.image_url.clone(),
                selling_price: row.selling_price.unwrap_or_default(),
                merchant_name: row
                    .merchant_name
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                entry_date: row.entry_date,
                total_sold: balance.total_sold,
                current_stock: balance.current_stock,
            });
        }

        Ok(lines)
    }

    /// Close out one line by appending an OUT_SETTLE event.
    ///
    /// The remaining stock is re-derived from the ledger immediately before
    /// writing; a stale worklist snapshot (concurrent settle or sale) turns
    /// into a conflict instead of a silent double settlement.
    pub async fn settle(&self, actor: Uuid, input: SettleInput) -> AppResult<StockEvent> {
        let window_start = self.window_start(input.merchant_id, input.outlet_id).await?;

        let fresh_stock = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT SUM(CASE WHEN type IN ('IN', 'ADJUSTMENT') THEN quantity ELSE -quantity END)::bigint
            FROM stock_logs
            WHERE merchant_id = $1 AND outlet_id = $2 AND product_id = $3
              AND ($4::date IS NULL OR entry_date > $4)
            "#,
        )
        .bind(input.merchant_id)
        .bind(input.outlet_id)
        .bind(input.product_id)
        .bind(window_start)
        .fetch_one(&self.db)
        .await?
        .unwrap_or(0);

        if fresh_stock <= 0 {
            return Err(AppError::Conflict {
                resource: "settlement".to_string(),
                message: "Nothing left to settle for this product; the worklist is stale"
                    .to_string(),
                message_id: "Tidak ada sisa stok untuk diselesaikan; daftar sudah tidak berlaku"
                    .to_string(),
            });
        }

        if let Some(expected) = input.expected_stock {
            if expected != fresh_stock {
                tracing::warn!(
                    product_id = %input.product_id,
                    outlet_id = %input.outlet_id,
                    expected,
                    fresh_stock,
                    "settlement snapshot diverged from fresh balance"
                );
            }
        }

        let event = NewStockEvent {
            merchant_id: input.merchant_id,
            outlet_id: input.outlet_id,
            product_id: input.product_id,
            quantity: fresh_stock,
            entry_date: Utc::now().date_naive(),
            event_type: StockEventType::OutSettle,
            created_by: actor,
        };

        let mut written = StockService::new(self.db.clone()).append(vec![event]).await?;

        written
            .pop()
            .ok_or_else(|| AppError::Internal("settlement append returned no event".to_string()))
    }
}
