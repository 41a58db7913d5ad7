//! Stock ledger models
//!
//! A stock event is written once and lives forever as an audit record.
//! Balances are derived from the event history on every read; there is no
//! stored counter to drift out of sync with the log.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of movement recorded in the stock ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockEventType {
    /// Consignment intake from a merchant
    In,
    /// Units sold through the POS
    OutSold,
    /// Remaining stock returned to the merchant at settlement
    OutSettle,
    /// Manual correction; quantity is signed
    Adjustment,
}

impl StockEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockEventType::In => "IN",
            StockEventType::OutSold => "OUT_SOLD",
            StockEventType::OutSettle => "OUT_SETTLE",
            StockEventType::Adjustment => "ADJUSTMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(StockEventType::In),
            "OUT_SOLD" => Some(StockEventType::OutSold),
            "OUT_SETTLE" => Some(StockEventType::OutSettle),
            "ADJUSTMENT" => Some(StockEventType::Adjustment),
            _ => None,
        }
    }
}

/// One immutable ledger entry recording an inventory movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEvent {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub outlet_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub event_type: StockEventType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A stock event that has not been written yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockEvent {
    pub merchant_id: Uuid,
    pub outlet_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub event_type: StockEventType,
    pub created_by: Uuid,
}

/// Grouping key for derived balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub product_id: Uuid,
    pub outlet_id: Uuid,
}

/// Derived on-hand totals for a (product, outlet) pair.
///
/// `current_stock` is always `total_in - total_sold - total_settle +
/// total_adjust`; adjustments carry their sign in the quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub total_in: i64,
    pub total_sold: i64,
    pub total_settle: i64,
    pub total_adjust: i64,
    pub current_stock: i64,
}

/// One unsettled position in a settlement worklist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementLine {
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub merchant_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub selling_price: Decimal,
    pub merchant_name: String,
    /// Date of the first movement inside the open window, for display
    pub entry_date: NaiveDate,
    pub total_sold: i64,
    pub current_stock: i64,
}
