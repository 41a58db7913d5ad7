//! Stock ledger aggregation tests
//!
//! Covers balance derivation from the append-only event log:
//! - balance equals sum(IN) - sum(OUT_SOLD) - sum(OUT_SETTLE)
//! - aggregation is independent of event ordering
//! - groups never bleed into each other

use proptest::prelude::*;
use uuid::Uuid;

use shared::ledger::{aggregate, balance_for, Movement};
use shared::models::{BalanceKey, StockEventType};

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

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario: IN 100, OUT_SOLD 30 for one pair
    #[test]
    fn test_in_minus_sold_scenario() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(
            vec![
                movement(product, outlet, StockEventType::In, 100),
                movement(product, outlet, StockEventType::OutSold, 30),
            ],
            product,
            outlet,
        );

        assert_eq!(balance.total_in, 100);
        assert_eq!(balance.total_sold, 30);
        assert_eq!(balance.total_settle, 0);
        assert_eq!(balance.current_stock, 70);
    }

    /// Settling the remainder brings the balance to zero
    #[test]
    fn test_settle_zeroes_balance() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(
            vec![
                movement(product, outlet, StockEventType::In, 100),
                movement(product, outlet, StockEventType::OutSold, 30),
                movement(product, outlet, StockEventType::OutSettle, 70),
            ],
            product,
            outlet,
        );

        assert_eq!(balance.current_stock, 0);
        assert_eq!(balance.total_settle, 70);
    }

    /// A group whose first event is not an IN still follows the formula
    #[test]
    fn test_leading_outflow_is_negative() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(
            vec![movement(product, outlet, StockEventType::OutSold, 7)],
            product,
            outlet,
        );

        assert_eq!(balance.current_stock, -7);
        assert_eq!(balance.total_in, 0);
    }

    /// Adjustments net with their sign
    #[test]
    fn test_signed_adjustments() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(
            vec![
                movement(product, outlet, StockEventType::In, 20),
                movement(product, outlet, StockEventType::Adjustment, -5),
            ],
            product,
            outlet,
        );

        assert_eq!(balance.total_adjust, -5);
        assert_eq!(balance.current_stock, 15);
    }

    /// The same product at two outlets forms two groups
    #[test]
    fn test_same_product_different_outlets() {
        let product = Uuid::new_v4();
        let outlet_a = Uuid::new_v4();
        let outlet_b = Uuid::new_v4();

        let balances = aggregate(vec![
            movement(product, outlet_a, StockEventType::In, 10),
            movement(product, outlet_b, StockEventType::In, 3),
            movement(product, outlet_a, StockEventType::OutSold, 2),
        ]);

        assert_eq!(
            balances[&BalanceKey {
                product_id: product,
                outlet_id: outlet_a
            }]
            .current_stock,
            8
        );
        assert_eq!(
            balances[&BalanceKey {
                product_id: product,
                outlet_id: outlet_b
            }]
            .current_stock,
            3
        );
    }

    /// Balances for movements of other pairs never leak in
    #[test]
    fn test_balance_for_filters_other_pairs() {
        let product = Uuid::new_v4();
        let other = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(
            vec![
                movement(product, outlet, StockEventType::In, 10),
                movement(other, outlet, StockEventType::In, 99),
            ],
            product,
            outlet,
        );

        assert_eq!(balance.total_in, 10);
    }

    /// No movements means no balance
    #[test]
    fn test_empty_ledger() {
        let product = Uuid::new_v4();
        let outlet = Uuid::new_v4();

        let balance = balance_for(Vec::new(), product, outlet);

        assert_eq!(balance.current_stock, 0);
        assert_eq!(balance.total_in, 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for event types with positive quantities
    fn typed_quantity_strategy() -> impl Strategy<Value = (StockEventType, i64)> {
        prop_oneof![
            (Just(StockEventType::In), 1i64..=1000),
            (Just(StockEventType::OutSold), 1i64..=1000),
            (Just(StockEventType::OutSettle), 1i64..=1000),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// current_stock == sum(IN) - sum(OUT_SOLD) - sum(OUT_SETTLE)
        #[test]
        fn prop_balance_matches_component_sums(
            events in prop::collection::vec(typed_quantity_strategy(), 1..50)
        ) {
            let product = Uuid::new_v4();
            let outlet = Uuid::new_v4();

            let movements: Vec<Movement> = events
                .iter()
                .map(|(event_type, qty)| movement(product, outlet, *event_type, *qty))
                .collect();

            let sum_of = |t: StockEventType| -> i64 {
                events
                    .iter()
                    .filter(|(event_type, _)| *event_type == t)
                    .map(|(_, qty)| qty)
                    .sum()
            };

            let balance = balance_for(movements, product, outlet);

            prop_assert_eq!(balance.total_in, sum_of(StockEventType::In));
            prop_assert_eq!(balance.total_sold, sum_of(StockEventType::OutSold));
            prop_assert_eq!(balance.total_settle, sum_of(StockEventType::OutSettle));
            prop_assert_eq!(
                balance.current_stock,
                sum_of(StockEventType::In)
                    - sum_of(StockEventType::OutSold)
                    - sum_of(StockEventType::OutSettle)
            );
        }

        /// Aggregation is independent of event ordering
        #[test]
        fn prop_order_independence(
            events in prop::collection::vec(typed_quantity_strategy(), 1..50),
            rotation in 0usize..50
        ) {
            let product = Uuid::new_v4();
            let outlet = Uuid::new_v4();

            let movements: Vec<Movement> = events
                .iter()
                .map(|(event_type, qty)| movement(product, outlet, *event_type, *qty))
                .collect();

            let mut reversed = movements.clone();
            reversed.reverse();

            let mut rotated = movements.clone();
            let pivot = rotation % rotated.len().max(1);
            rotated.rotate_left(pivot);

            let base = balance_for(movements, product, outlet);
            prop_assert_eq!(base, balance_for(reversed, product, outlet));
            prop_assert_eq!(base, balance_for(rotated, product, outlet));
        }

        /// Aggregating twice without new events gives identical results
        #[test]
        fn prop_aggregation_is_idempotent(
            events in prop::collection::vec(typed_quantity_strategy(), 0..30)
        ) {
            let product = Uuid::new_v4();
            let outlet = Uuid::new_v4();

            let movements: Vec<Movement> = events
                .iter()
                .map(|(event_type, qty)| movement(product, outlet, *event_type, *qty))
                .collect();

            let first = aggregate(movements.clone());
            let second = aggregate(movements);

            prop_assert_eq!(first, second);
        }

        /// Splitting a ledger into two batches and summing the balances
        /// matches aggregating everything at once
        #[test]
        fn prop_aggregation_is_additive(
            first in prop::collection::vec(typed_quantity_strategy(), 0..25),
            second in prop::collection::vec(typed_quantity_strategy(), 0..25)
        ) {
            let product = Uuid::new_v4();
            let outlet = Uuid::new_v4();

            let to_movements = |events: &[(StockEventType, i64)]| -> Vec<Movement> {
                events
                    .iter()
                    .map(|(event_type, qty)| movement(product, outlet, *event_type, *qty))
                    .collect()
            };

            let all: Vec<Movement> = to_movements(&first)
                .into_iter()
                .chain(to_movements(&second))
                .collect();

            let combined = balance_for(all, product, outlet);
            let a = balance_for(to_movements(&first), product, outlet);
            let b = balance_for(to_movements(&second), product, outlet);

            prop_assert_eq!(combined.total_in, a.total_in + b.total_in);
            prop_assert_eq!(combined.total_sold, a.total_sold + b.total_sold);
            prop_assert_eq!(combined.total_settle, a.total_settle + b.total_settle);
            prop_assert_eq!(combined.current_stock, a.current_stock + b.current_stock);
        }
    }
}
