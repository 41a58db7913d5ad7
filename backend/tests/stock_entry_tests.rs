//! Daily stock-in workflow tests
//!
//! The intake gate allows stock-in only when the merchant already has
//! positive on-hand stock at the outlet and no IN was recorded today for
//! the pair. These tests simulate the gate and the bulk submission
//! filtering.

use chrono::NaiveDate;
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Eligibility result mirroring the workflow contract
#[derive(Debug, PartialEq)]
struct Eligibility {
    has_stock: bool,
}

/// Gate: positive derived balance AND no IN recorded today
fn check_eligibility(current_balance: i64, in_dates: &[NaiveDate], today: NaiveDate) -> Eligibility {
    if current_balance <= 0 {
        return Eligibility { has_stock: false };
    }

    let already_input_today = in_dates.iter().any(|d| *d == today);

    Eligibility {
        has_stock: !already_input_today,
    }
}

/// Bulk submission: drop non-positive quantities, reject an empty result
fn prepare_bulk(items: &[i64]) -> Result<Vec<i64>, &'static str> {
    let surviving: Vec<i64> = items.iter().copied().filter(|qty| *qty > 0).collect();

    if surviving.is_empty() {
        return Err("no items to submit");
    }

    Ok(surviving)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_zero_balance_blocks_even_without_todays_entry() {
    let today = date(2024, 6, 10);
    let eligibility = check_eligibility(0, &[], today);

    assert!(!eligibility.has_stock);
}

#[test]
fn test_negative_balance_blocks() {
    let today = date(2024, 6, 10);
    let eligibility = check_eligibility(-3, &[], today);

    assert!(!eligibility.has_stock);
}

#[test]
fn test_todays_entry_blocks_despite_positive_balance() {
    let today = date(2024, 6, 10);
    let eligibility = check_eligibility(42, &[today], today);

    assert!(!eligibility.has_stock);
}

#[test]
fn test_yesterdays_entry_does_not_block() {
    let today = date(2024, 6, 10);
    let eligibility = check_eligibility(42, &[date(2024, 6, 9)], today);

    assert!(eligibility.has_stock);
}

#[test]
fn test_all_zero_quantities_rejected() {
    assert_eq!(prepare_bulk(&[0, 0, 0]), Err("no items to submit"));
}

#[test]
fn test_negative_quantities_are_dropped() {
    assert_eq!(prepare_bulk(&[-5, 0, 12, 3]), Ok(vec![12, 3]));
}

#[test]
fn test_empty_submission_rejected() {
    assert_eq!(prepare_bulk(&[]), Err("no items to submit"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Surviving items are exactly the positive ones, order preserved
    #[test]
    fn prop_bulk_filter_keeps_positive_only(items in prop::collection::vec(-100i64..=100, 0..20)) {
        match prepare_bulk(&items) {
            Ok(surviving) => {
                prop_assert!(!surviving.is_empty());
                prop_assert!(surviving.iter().all(|qty| *qty > 0));
                let expected: Vec<i64> = items.iter().copied().filter(|q| *q > 0).collect();
                prop_assert_eq!(surviving, expected);
            }
            Err(_) => {
                prop_assert!(items.iter().all(|qty| *qty <= 0));
            }
        }
    }

    /// The gate never opens on a non-positive balance
    #[test]
    fn prop_gate_requires_positive_balance(balance in -1000i64..=0) {
        let today = date(2024, 6, 10);
        prop_assert!(!check_eligibility(balance, &[], today).has_stock);
    }

    /// With positive balance, the gate state is exactly "no IN today"
    #[test]
    fn prop_gate_is_daily(
        balance in 1i64..=1000,
        day_offsets in prop::collection::vec(0i64..=30, 0..5)
    ) {
        let today = date(2024, 6, 30);
        let in_dates: Vec<NaiveDate> = day_offsets
            .iter()
            .map(|offset| today - chrono::Duration::days(*offset))
            .collect();

        let eligibility = check_eligibility(balance, &in_dates, today);
        let has_entry_today = in_dates.contains(&today);

        prop_assert_eq!(eligibility.has_stock, !has_entry_today);
    }
}
