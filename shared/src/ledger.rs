//! Pure balance aggregation over stock movements
//!
//! Everything here is deterministic and free of I/O: callers fetch ledger
//! rows however they like, map them into [`Movement`]s, and reduce. Because
//! summation is commutative the result is independent of event order.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Balance, BalanceKey, StockEventType};

/// The fields of a stock event that matter for balance derivation
#[derive(Debug, Clone, Copy)]
pub struct Movement {
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub event_type: StockEventType,
    pub quantity: i64,
}

/// Fold movements into per-(product, outlet) balances.
///
/// `current_stock = total_in - total_sold - total_settle + total_adjust`
/// for every group, including groups that only ever saw a single event.
pub fn aggregate<I>(movements: I) -> HashMap<BalanceKey, Balance>
where
    I: IntoIterator<Item = Movement>,
{
    let mut balances: HashMap<BalanceKey, Balance> = HashMap::new();

    for movement in movements {
        let key = BalanceKey {
            product_id: movement.product_id,
            outlet_id: movement.outlet_id,
        };
        let balance = balances.entry(key).or_default();

        match movement.event_type {
            StockEventType::In => balance.total_in += movement.quantity,
            StockEventType::OutSold => balance.total_sold += movement.quantity,
            StockEventType::OutSettle => balance.total_settle += movement.quantity,
            // Adjustments carry their sign in the quantity
            StockEventType::Adjustment => balance.total_adjust += movement.quantity,
        }

        balance.current_stock =
            balance.total_in - balance.total_sold - balance.total_settle + balance.total_adjust;
    }

    balances
}

/// Derive the balance of a single (product, outlet) pair, ignoring movements
/// that belong to other pairs.
pub fn balance_for<I>(movements: I, product_id: Uuid, outlet_id: Uuid) -> Balance
where
    I: IntoIterator<Item = Movement>,
{
    let key = BalanceKey {
        product_id,
        outlet_id,
    };
    aggregate(
        movements
            .into_iter()
            .filter(|m| m.product_id == product_id && m.outlet_id == outlet_id),
    )
    .remove(&key)
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(
        product_id: Uuid,
        outlet_id: Uuid,
        event_type: StockEventType,
        quantity: i64,
    ) -> Movement {
        Movement {
            product_id,
            outlet_id,
            event_type,
            quantity,
        }
    }

    #[test]
    fn test_in_and_sold_balance() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let movements = vec![
            movement(product, outlet, StockEventType::In, 100),
            movement(product, outlet, StockEventType::OutSold, 30),
        ];

        let balance = balance_for(movements, product, outlet);

        assert_eq!(balance.total_in, 100);
        assert_eq!(balance.total_sold, 30);
        assert_eq!(balance.total_settle, 0);
        assert_eq!(balance.current_stock, 70);
    }

    #[test]
    fn test_single_non_in_event_group() {
        // A group whose only event is an outflow must still follow the
        // subtraction formula rather than special-casing the first event.
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let movements = vec![movement(product, outlet, StockEventType::OutSold, 5)];

        let balance = balance_for(movements, product, outlet);

        assert_eq!(balance.total_sold, 5);
        assert_eq!(balance.current_stock, -5);
    }

    #[test]
    fn test_settle_closes_out_stock() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let movements = vec![
            movement(product, outlet, StockEventType::In, 100),
            movement(product, outlet, StockEventType::OutSold, 30),
            movement(product, outlet, StockEventType::OutSettle, 70),
        ];

        let balance = balance_for(movements, product, outlet);

        assert_eq!(balance.current_stock, 0);
    }

    #[test]
    fn test_adjustment_is_signed() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let movements = vec![
            movement(product, outlet, StockEventType::In, 10),
            movement(product, outlet, StockEventType::Adjustment, -3),
            movement(product, outlet, StockEventType::Adjustment, 1),
        ];

        let balance = balance_for(movements, product, outlet);

        assert_eq!(balance.total_adjust, -2);
        assert_eq!(balance.current_stock, 8);
    }

    #[test]
    fn test_groups_do_not_bleed_into_each_other() {
        let product_a = Uuid::new_v4();
        let product_b = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let movements = vec![
            movement(product_a, outlet, StockEventType::In, 10),
            movement(product_b, outlet, StockEventType::In, 20),
            movement(product_a, outlet, StockEventType::OutSold, 4),
        ];

        let balances = aggregate(movements);

        assert_eq!(balances.len(), 2);
        assert_eq!(
            balances[&BalanceKey {
                product_id: product_a,
                outlet_id: outlet
            }]
            .current_stock,
            6
        );
        assert_eq!(
            balances[&BalanceKey {
                product_id: product_b,
                outlet_id: outlet
            }]
            .current_stock,
            20
        );
    }

    #[test]
    fn test_order_independence() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();
        let forward = vec![
            movement(product, outlet, StockEventType::In, 100),
            movement(product, outlet, StockEventType::OutSold, 25),
            movement(product, outlet, StockEventType::OutSettle, 40),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            balance_for(forward, product, outlet),
            balance_for(reversed, product, outlet)
        );
    }

    #[test]
    fn test_empty_input_yields_no_balances() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
