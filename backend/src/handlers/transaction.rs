//! HTTP handler for the POS sale webhook
//!
//! The POS subsystem signs each completed-sale notification with
//! HMAC-SHA256 over the raw body; a request that fails verification never
//! reaches the ledger.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{AppError, AppResult};
use crate::services::transaction::{CompletedSaleEvent, TransactionBridgeService};
use crate::AppState;

/// Signature header set by the POS subsystem
const SIGNATURE_HEADER: &str = "x-pos-signature";

/// Response for webhook processing
#[derive(Debug, Serialize)]
pub struct SaleWebhookResponse {
    pub success: bool,
    pub events_recorded: usize,
}

/// Handle a completed-sale notification
/// POST /webhook/pos-sale
pub async fn handle_pos_sale_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<SaleWebhookResponse>> {
    if let Err(e) = verify_pos_signature(&headers, &body, &state.config.pos.webhook_secret) {
        tracing::warn!("POS webhook signature verification failed: {}", e);
        return Err(AppError::Unauthorized {
            message: "Invalid webhook signature".to_string(),
            message_id: "Tanda tangan webhook tidak valid".to_string(),
        });
    }

    let sale: CompletedSaleEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::ValidationError(format!("malformed sale payload: {}", e)))?;

    let service = TransactionBridgeService::new(state.db.clone());
    let events = service.record_completed_sale(sale).await?;

    Ok(Json(SaleWebhookResponse {
        success: true,
        events_recorded: events.len(),
    }))
}

/// Verify the HMAC-SHA256 signature of the webhook body
fn verify_pos_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> Result<(), String> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| "missing signature header".to_string())?;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("invalid secret: {}", e))?;
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    if expected != signature {
        return Err("signature mismatch".to_string());
    }

    Ok(())
}
