//! Daily stock-in workflow
//!
//! Consignment intake happens at most once per (outlet, merchant) per day,
//! and only against inventory that is already moving at the outlet; new
//! merchants and products onboard through the catalog, not through this gate.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{NewStockEvent, StockEventType};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// Stock entry service enforcing the once-per-day intake gate
#[derive(Clone)]
pub struct StockEntryService {
    db: PgPool,
}

/// One product line in a bulk intake submission
#[derive(Debug, Clone, Deserialize)]
pub struct StockEntryItem {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Input for a bulk intake session
#[derive(Debug, Deserialize)]
pub struct BulkStockEntryInput {
    pub merchant_id: Uuid,
    pub outlet_id: Uuid,
    /// Defaults to today when omitted
    pub entry_date: Option<NaiveDate>,
    pub items: Vec<StockEntryItem>,
}

/// Whether the stock-in action is available for an (outlet, merchant) pair
#[derive(Debug, Clone, Serialize)]
pub struct EntryEligibility {
    pub has_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
}

impl StockEntryService {
    /// Create a new StockEntryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Check whether stock-in is currently allowed for the pair.
    ///
    /// Allowed only when (a) some product of the merchant has positive
    /// derived on-hand stock at the outlet and (b) no IN event has been
    /// recorded today for the pair.
    pub async fn check_eligibility(
        &self,
        outlet_id: Uuid,
        merchant_id: Uuid,
    ) -> AppResult<EntryEligibility> {
        // (a) at least one product with a positive derived balance
        let merchant_name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT m.name
            FROM stock_logs sl
            JOIN merchants m ON m.id = sl.merchant_id
            WHERE sl.outlet_id = $1 AND sl.merchant_id = $2
            GROUP BY sl.product_id, m.name
            HAVING SUM(CASE WHEN sl.type IN ('IN', 'ADJUSTMENT') THEN sl.quantity ELSE -sl.quantity END) > 0
            LIMIT 1
            "#,
        )
        .bind(outlet_id)
        .bind(merchant_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(merchant_name) = merchant_name else {
            return Ok(EntryEligibility {
                has_stock: false,
                merchant_name: None,
            });
        };

        // (b) no intake recorded yet today
        let today = Utc::now().date_naive();
        let already_input_today = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stock_logs
                WHERE outlet_id = $1 AND merchant_id = $2 AND type = 'IN' AND entry_date = $3
            )
            "#,
        )
        .bind(outlet_id)
        .bind(merchant_id)
        .bind(today)
        .fetch_one(&self.db)
        .await?;

        Ok(EntryEligibility {
            has_stock: !already_input_today,
            merchant_name: Some(merchant_name),
        })
    }

    /// Record one intake session as a batch of IN events.
    ///
    /// Non-positive quantities are dropped before dispatch; an empty
    /// surviving list is the caller's mistake. A second session for the same
    /// pair and date is a conflict, re-checked here rather than trusting the
    /// eligibility snapshot.
    pub async fn submit_bulk(&self, actor: Uuid, input: BulkStockEntryInput) -> AppResult<usize> {
        let entry_date = input.entry_date.unwrap_or_else(|| Utc::now().date_naive());

        let items: Vec<StockEntryItem> = input
            .items
            .into_iter()
            .filter(|item| item.quantity > 0)
            .collect();

        if items.is_empty() {
            return Err(AppError::ValidationError("no items to submit".to_string()));
        }

        let duplicate_session = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stock_logs
                WHERE outlet_id = $1 AND merchant_id = $2 AND type = 'IN' AND entry_date = $3
            )
            "#,
        )
        .bind(input.outlet_id)
        .bind(input.merchant_id)
        .bind(entry_date)
        .fetch_one(&self.db)
        .await?;

        if duplicate_session {
            return Err(AppError::Conflict {
                resource: "stock_entry".to_string(),
                message: "Stock has already been recorded for this merchant and outlet today"
                    .to_string(),
                message_id: "Stok untuk merchant dan outlet ini sudah dicatat hari ini".to_string(),
            });
        }

        let events: Vec<NewStockEvent> = items
            .into_iter()
            .map(|item| NewStockEvent {
                merchant_id: input.merchant_id,
                outlet_id: input.outlet_id,
                product_id: item.product_id,
                quantity: item.quantity,
                entry_date,
                event_type: StockEventType::In,
                created_by: actor,
            })
            .collect();

        let written = StockService::new(self.db.clone()).append(events).await?;

        Ok(written.len())
    }

    /// Correct the quantity of a previously recorded intake.
    ///
    /// IN rows are the only editable ledger entries; everything else is
    /// immutable audit history.
    pub async fn correct_entry(&self, id: Uuid, quantity: i64) -> AppResult<()> {
        self.ensure_in_entry(id).await?;
        StockService::new(self.db.clone())
            .update_quantity(id, quantity)
            .await
    }

    /// Delete an intake recorded by mistake.
    pub async fn delete_entry(&self, id: Uuid) -> AppResult<()> {
        self.ensure_in_entry(id).await?;
        StockService::new(self.db.clone()).delete(id).await
    }

    async fn ensure_in_entry(&self, id: Uuid) -> AppResult<()> {
        let event_type = sqlx::query_scalar::<_, String>("SELECT type FROM stock_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock event".to_string()))?;

        if event_type != StockEventType::In.as_str() {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Only IN entries can be corrected or deleted".to_string(),
                message_id: "Hanya entri stok masuk yang dapat diubah atau dihapus".to_string(),
            });
        }

        Ok(())
    }
}
