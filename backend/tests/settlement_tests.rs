//! Consignment settlement window tests
//!
//! The settlement engine derives a worklist from events strictly after the
//! pair's last OUT_SETTLE date. These tests simulate that window logic over
//! dated events:
//! - worklist computation is idempotent
//! - the window boundary day itself is excluded
//! - settling advances the window and restarts the cycle

use chrono::NaiveDate;
use uuid::Uuid;

use shared::ledger::{aggregate, Movement};
use shared::models::{Balance, BalanceKey, StockEventType};

/// A ledger event as the settlement engine sees it
#[derive(Debug, Clone)]
struct DatedEvent {
    product_id: Uuid,
    outlet_id: Uuid,
    event_type: StockEventType,
    quantity: i64,
    entry_date: NaiveDate,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Most recent OUT_SETTLE entry date, or None for a window open from the
/// beginning
fn window_start(events: &[DatedEvent]) -> Option<NaiveDate> {
    events
        .iter()
        .filter(|e| e.event_type == StockEventType::OutSettle)
        .map(|e| e.entry_date)
        .max()
}

/// Worklist: aggregate events strictly inside the open window, keep only
/// positive balances
fn worklist(events: &[DatedEvent]) -> Vec<(Uuid, Balance)> {
    let start = window_start(events);

    let in_window = events
        .iter()
        .filter(|e| start.map_or(true, |s| e.entry_date > s))
        .map(|e| Movement {
            product_id: e.product_id,
            outlet_id: e.outlet_id,
            event_type: e.event_type,
            quantity: e.quantity,
        });

    let mut lines: Vec<(Uuid, Balance)> = aggregate(in_window)
        .into_iter()
        .filter(|(_, balance)| balance.current_stock > 0)
        .map(|(key, balance)| (key.product_id, balance))
        .collect();
    lines.sort_by_key(|(product_id, _)| *product_id);
    lines
}

/// Settle one product: re-derive the fresh stock inside the window and
/// append the closing event, or report a conflict when nothing is left
fn simulate_settle(
    events: &mut Vec<DatedEvent>,
    product_id: Uuid,
    outlet_id: Uuid,
    settle_date: NaiveDate,
) -> Result<i64, &'static str> {
    let start = window_start(events);

    let fresh: Balance = aggregate(
        events
            .iter()
            .filter(|e| e.product_id == product_id && e.outlet_id == outlet_id)
            .filter(|e| start.map_or(true, |s| e.entry_date > s))
            .map(|e| Movement {
                product_id: e.product_id,
                outlet_id: e.outlet_id,
                event_type: e.event_type,
                quantity: e.quantity,
            }),
    )
    .remove(&BalanceKey {
        product_id,
        outlet_id,
    })
    .unwrap_or_default();

    if fresh.current_stock <= 0 {
        return Err("nothing left to settle");
    }

    events.push(DatedEvent {
        product_id,
        outlet_id,
        event_type: StockEventType::OutSettle,
        quantity: fresh.current_stock,
        entry_date: settle_date,
    });

    Ok(fresh.current_stock)
}

#[test]
fn test_worklist_is_idempotent() {
    let product = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let events = vec![
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 100,
            entry_date: date(2024, 1, 1),
        },
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::OutSold,
            quantity: 30,
            entry_date: date(2024, 1, 5),
        },
    ];

    let first = worklist(&events);
    let second = worklist(&events);

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].1.current_stock, 70);
    assert_eq!(first[0].1.total_sold, 30);
}

#[test]
fn test_settle_advances_window() {
    let product = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let mut events = vec![
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 100,
            entry_date: date(2024, 1, 1),
        },
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::OutSold,
            quantity: 30,
            entry_date: date(2024, 1, 5),
        },
    ];

    let settled = simulate_settle(&mut events, product, outlet, date(2024, 1, 6)).unwrap();
    assert_eq!(settled, 70);

    // New consignment after the settlement
    events.push(DatedEvent {
        product_id: product,
        outlet_id: outlet,
        event_type: StockEventType::In,
        quantity: 50,
        entry_date: date(2024, 1, 10),
    });

    // The next worklist only sees the new window: no carried-over sales,
    // no already-settled stock
    let lines = worklist(&events);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1.current_stock, 50);
    assert_eq!(lines[0].1.total_sold, 0);
}

#[test]
fn test_window_boundary_day_is_excluded() {
    let product = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let events = vec![
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::OutSettle,
            quantity: 10,
            entry_date: date(2024, 2, 1),
        },
        // Same-day intake is part of the closed window, not the new one
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 25,
            entry_date: date(2024, 2, 1),
        },
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 40,
            entry_date: date(2024, 2, 2),
        },
    ];

    let lines = worklist(&events);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1.current_stock, 40);
}

#[test]
fn test_fully_sold_line_is_omitted() {
    let product = Uuid::new_v4();
    let other = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let events = vec![
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 10,
            entry_date: date(2024, 3, 1),
        },
        DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::OutSold,
            quantity: 10,
            entry_date: date(2024, 3, 2),
        },
        DatedEvent {
            product_id: other,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: 5,
            entry_date: date(2024, 3, 1),
        },
    ];

    let lines = worklist(&events);

    // Only the product with remaining stock shows up
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, other);
}

#[test]
fn test_double_settle_is_a_conflict() {
    let product = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let mut events = vec![DatedEvent {
        product_id: product,
        outlet_id: outlet,
        event_type: StockEventType::In,
        quantity: 15,
        entry_date: date(2024, 4, 1),
    }];

    assert_eq!(
        simulate_settle(&mut events, product, outlet, date(2024, 4, 2)),
        Ok(15)
    );

    // A concurrent settler re-deriving the balance now finds nothing left
    assert!(simulate_settle(&mut events, product, outlet, date(2024, 4, 2)).is_err());
}

#[test]
fn test_settlement_cycle_repeats() {
    let product = Uuid::new_v4();
    let outlet = Uuid::new_v4();
    let mut events = Vec::new();

    for (intake_day, settle_day, qty) in [(1, 5, 30), (10, 15, 20), (20, 25, 45)] {
        events.push(DatedEvent {
            product_id: product,
            outlet_id: outlet,
            event_type: StockEventType::In,
            quantity: qty,
            entry_date: date(2024, 5, intake_day),
        });

        let settled = simulate_settle(&mut events, product, outlet, date(2024, 5, settle_day));
        assert_eq!(settled, Ok(qty));
    }

    // Every window closed; no open worklist remains
    assert!(worklist(&events).is_empty());
}
