//! Property tests for derived totals.
//!
//! Totals are computed by summation over the live collection, so they must
//! agree with an independent recomputation after any sequence of adds and
//! quantity steps.

#![allow(clippy::unwrap_used)] // Test code can use unwrap

use cartflow_cart::mocks::{MockDeliveryFeeProvider, MockOrderSubmissionService, MockSessionStore};
use cartflow_cart::{
    CartAction, CartEnvironment, CartItemInput, CartReducer, CartState, Money, ProductId,
};
use cartflow_core::reducer::Reducer;
use cartflow_testing::test_clock;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn env() -> CartEnvironment {
    CartEnvironment::new(
        Arc::new(MockSessionStore::anonymous()),
        Arc::new(MockOrderSubmissionService::new()),
        Arc::new(MockDeliveryFeeProvider::flat(Money::ZERO)),
        Arc::new(test_clock()),
    )
}

fn arb_input() -> impl Strategy<Value = CartItemInput> {
    (1u32..6, 0i64..10_000, prop_oneof![Just(None), Just(Some("M")), Just(Some("L"))]).prop_map(
        |(id, price_cents, size)| CartItemInput {
            product_id: ProductId::new(format!("p-{id}")),
            name: format!("Product {id}"),
            unit_price: Money::from_cents(price_cents),
            image: String::new(),
            size: size.map(str::to_string),
            color: None,
        },
    )
}

proptest! {
    #[test]
    fn total_matches_independent_recomputation(inputs in prop::collection::vec(arb_input(), 0..40)) {
        let env = env();
        let reducer = CartReducer;
        let mut state = CartState::new();

        for input in &inputs {
            reducer.reduce(&mut state, CartAction::AddItem(input.clone()), &env);
        }

        let expected: i64 = state
            .items
            .iter()
            .map(|item| item.unit_price.cents() * i64::from(item.quantity))
            .sum();
        prop_assert_eq!(state.total_amount().cents(), expected);
        prop_assert_eq!(state.item_count() as usize, inputs.len());
    }

    #[test]
    fn composite_keys_stay_unique(inputs in prop::collection::vec(arb_input(), 0..40)) {
        let env = env();
        let reducer = CartReducer;
        let mut state = CartState::new();

        for input in inputs {
            reducer.reduce(&mut state, CartAction::AddItem(input), &env);
        }

        // A repeated (product, size, color) must merge, never fork a line
        let distinct: HashSet<_> = state.all_keys().into_iter().collect();
        prop_assert_eq!(distinct.len(), state.items.len());
    }

    #[test]
    fn full_selection_subtotal_equals_total(inputs in prop::collection::vec(arb_input(), 0..40)) {
        let env = env();
        let reducer = CartReducer;
        let mut state = CartState::new();

        for input in inputs {
            reducer.reduce(&mut state, CartAction::AddItem(input), &env);
        }

        let full: HashSet<_> = state.all_keys().into_iter().collect();
        prop_assert_eq!(state.selection_subtotal(&full), state.total_amount());
        prop_assert_eq!(state.selection_subtotal(&HashSet::new()), Money::ZERO);
    }

    #[test]
    fn add_then_decrement_is_identity(inputs in prop::collection::vec(arb_input(), 0..20)) {
        let env = env();
        let reducer = CartReducer;
        let mut state = CartState::new();
        for input in &inputs {
            reducer.reduce(&mut state, CartAction::AddItem(input.clone()), &env);
        }
        let before = state.clone();

        // One extra unit of the first input, then take it right back off
        if let Some(input) = inputs.first() {
            reducer.reduce(&mut state, CartAction::AddItem(input.clone()), &env);
            reducer.reduce(
                &mut state,
                CartAction::DecrementQuantity { key: input.key() },
                &env,
            );
        }

        prop_assert_eq!(state, before);
    }

    #[test]
    fn quantities_never_persist_at_zero(inputs in prop::collection::vec(arb_input(), 0..40)) {
        let env = env();
        let reducer = CartReducer;
        let mut state = CartState::new();

        for input in &inputs {
            reducer.reduce(&mut state, CartAction::AddItem(input.clone()), &env);
        }
        // Decrement everything once
        for key in state.all_keys() {
            reducer.reduce(&mut state, CartAction::DecrementQuantity { key }, &env);
        }

        prop_assert!(state.items.iter().all(|item| item.quantity >= 1));
    }
}
