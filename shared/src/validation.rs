//! Validation utilities for the Titipan Back-Office
//!
//! Includes Indonesia-specific validations matching the deployment market.

use rust_decimal::Decimal;

use crate::models::StockEventType;

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate the quantity of a stock event.
///
/// Every event type requires a strictly positive quantity except
/// `ADJUSTMENT`, where the sign carries meaning and only zero is rejected.
pub fn validate_event_quantity(event_type: StockEventType, quantity: i64) -> Result<(), &'static str> {
    match event_type {
        StockEventType::Adjustment => {
            if quantity == 0 {
                return Err("Adjustment quantity cannot be zero");
            }
        }
        _ => {
            if quantity <= 0 {
                return Err("Quantity must be positive");
            }
        }
    }
    Ok(())
}

/// Validate a corrected quantity for an existing IN row
pub fn validate_corrected_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a product SKU (3-20 uppercase alphanumeric, dashes allowed)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 3 {
        return Err("SKU must be at least 3 characters");
    }
    if sku.len() > 20 {
        return Err("SKU must be at most 20 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric with optional dashes");
    }
    Ok(())
}

/// Validate that selling price is not below cost price and neither is negative
pub fn validate_price_pair(cost_price: Decimal, selling_price: Decimal) -> Result<(), &'static str> {
    if cost_price < Decimal::ZERO || selling_price < Decimal::ZERO {
        return Err("Prices cannot be negative");
    }
    if selling_price < cost_price {
        return Err("Selling price cannot be below cost price");
    }
    Ok(())
}

// ============================================================================
// Indonesia-Specific Validations
// ============================================================================

/// Validate an Indonesian phone number format
/// Accepts: 081234567890, 0812-3456-7890, +6281234567890
pub fn validate_indonesian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Domestic mobile: 10-13 digits starting with 08
    if digits.len() >= 10 && digits.len() <= 13 && digits.starts_with("08") {
        return Ok(());
    }

    // International format: +62 followed by 9-12 digits
    if phone.starts_with("+62") && digits.len() >= 11 && digits.len() <= 14 && digits.starts_with("62")
    {
        return Ok(());
    }

    Err("Invalid Indonesian phone number")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_validate_event_quantity_positive_types() {
        assert!(validate_event_quantity(StockEventType::In, 10).is_ok());
        assert!(validate_event_quantity(StockEventType::OutSold, 1).is_ok());
        assert!(validate_event_quantity(StockEventType::In, 0).is_err());
        assert!(validate_event_quantity(StockEventType::OutSettle, -5).is_err());
    }

    #[test]
    fn test_validate_event_quantity_adjustment_signed() {
        assert!(validate_event_quantity(StockEventType::Adjustment, -3).is_ok());
        assert!(validate_event_quantity(StockEventType::Adjustment, 3).is_ok());
        assert!(validate_event_quantity(StockEventType::Adjustment, 0).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("JJM-001").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("ab").is_err());
        assert!(validate_sku("lowercase-sku").is_err());
        assert!(validate_sku("WAY-TOO-LONG-SKU-CODE-123").is_err());
    }

    #[test]
    fn test_validate_price_pair() {
        assert!(validate_price_pair(Decimal::from(1000), Decimal::from(1500)).is_ok());
        assert!(validate_price_pair(Decimal::from(1500), Decimal::from(1000)).is_err());
        assert!(validate_price_pair(Decimal::from(-1), Decimal::from(0)).is_err());
    }

    #[test]
    fn test_validate_indonesian_phone_valid() {
        assert!(validate_indonesian_phone("081234567890").is_ok());
        assert!(validate_indonesian_phone("0812-3456-7890").is_ok());
        assert!(validate_indonesian_phone("+6281234567890").is_ok());
    }

    #[test]
    fn test_validate_indonesian_phone_invalid() {
        assert!(validate_indonesian_phone("12345").is_err());
        assert!(validate_indonesian_phone("0212345678901234").is_err());
        assert!(validate_indonesian_phone("+15551234567").is_err());
    }
}
