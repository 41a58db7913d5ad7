//! POS sale ledger bridge
//!
//! Sale processing itself lives in the external POS subsystem; this service
//! only consumes its completed-sale notifications and records one OUT_SOLD
//! ledger event per line item, which is what keeps derived balances honest.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{NewStockEvent, StockEvent, StockEventType};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// Bridge from completed POS sales into the stock ledger
#[derive(Clone)]
pub struct TransactionBridgeService {
    db: PgPool,
}

/// One line item of a completed sale
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLineItem {
    pub product_id: Uuid,
    pub merchant_id: Uuid,
    pub quantity: i64,
}

/// A completed sale as reported by the POS subsystem
#[derive(Debug, Deserialize)]
pub struct CompletedSaleEvent {
    pub transaction_id: Uuid,
    pub outlet_id: Uuid,
    pub cashier_id: Uuid,
    pub sale_date: NaiveDate,
    pub items: Vec<SaleLineItem>,
}

impl TransactionBridgeService {
    /// Create a new TransactionBridgeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record the ledger side of a completed sale.
    ///
    /// Zero-quantity lines are dropped; a sale without any surviving line is
    /// rejected. All events of one sale are appended atomically.
    pub async fn record_completed_sale(
        &self,
        sale: CompletedSaleEvent,
    ) -> AppResult<Vec<StockEvent>> {
        let items: Vec<SaleLineItem> = sale
            .items
            .into_iter()
            .filter(|item| item.quantity > 0)
            .collect();

        if items.is_empty() {
            return Err(AppError::ValidationError(
                "sale has no items with positive quantity".to_string(),
            ));
        }

        let events: Vec<NewStockEvent> = items
            .into_iter()
            .map(|item| NewStockEvent {
                merchant_id: item.merchant_id,
                outlet_id: sale.outlet_id,
                product_id: item.product_id,
                quantity: item.quantity,
                entry_date: sale.sale_date,
                event_type: StockEventType::OutSold,
                created_by: sale.cashier_id,
            })
            .collect();

        let written = StockService::new(self.db.clone()).append(events).await?;

        tracing::info!(
            transaction_id = %sale.transaction_id,
            outlet_id = %sale.outlet_id,
            events = written.len(),
            "recorded sale into stock ledger"
        );

        Ok(written)
    }
}
