//! End-to-end cart flows through the store runtime.
//!
//! These tests exercise the full loop: actions through the store, the
//! submission effect running in a spawned task, and the terminal action fed
//! back into the reducer.

#![allow(clippy::unwrap_used)] // Test code can use unwrap

use cartflow_cart::mocks::{MockDeliveryFeeProvider, MockOrderSubmissionService, MockSessionStore};
use cartflow_cart::{
    CartAction, CartEnvironment, CartError, CartItemInput, CartReducer, CartState, ItemKey, Money,
    OrderConfirmation, OrderId, ProductId, SubmissionError, SubmissionStatus,
};
use cartflow_runtime::Store;
use cartflow_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

type CartStore = Store<CartState, CartAction, CartEnvironment, CartReducer>;

fn input(id: &str, price_dollars: i64, size: Option<&str>) -> CartItemInput {
    CartItemInput {
        product_id: ProductId::new(id),
        name: format!("Product {id}"),
        unit_price: Money::from_dollars(price_dollars),
        image: String::new(),
        size: size.map(str::to_string),
        color: None,
    }
}

fn store_with(
    session: MockSessionStore,
    orders: MockOrderSubmissionService,
    fees: MockDeliveryFeeProvider,
) -> (CartStore, Arc<MockOrderSubmissionService>) {
    let orders = Arc::new(orders);
    let env = CartEnvironment::new(
        Arc::new(session),
        Arc::clone(&orders) as _,
        Arc::new(fees),
        Arc::new(test_clock()),
    );
    (Store::new(CartState::new(), CartReducer, env), orders)
}

fn is_terminal(action: &CartAction) -> bool {
    matches!(
        action,
        CartAction::SubmissionSucceeded { .. } | CartAction::SubmissionFailed { .. }
    )
}

#[tokio::test]
async fn add_then_submit_happy_path() {
    let (store, orders) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::succeeding_with("order-42"),
        MockDeliveryFeeProvider::flat(Money::from_dollars(2)),
    );

    store
        .send(CartAction::AddItem(input("1", 10, Some("M"))))
        .await
        .unwrap();
    store
        .send(CartAction::AddItem(input("1", 10, Some("M"))))
        .await
        .unwrap();
    store
        .send(CartAction::AddItem(input("2", 5, None)))
        .await
        .unwrap();

    let keys = store.state(|s| s.all_keys()).await;
    let outcome = store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, CartAction::SubmissionSucceeded { .. }));
    let state = store.state(Clone::clone).await;
    assert!(state.items.is_empty());
    assert_eq!(
        state.submission,
        SubmissionStatus::Succeeded {
            order_id: OrderId::new("order-42")
        }
    );

    let requests = orders.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].subtotal, Money::from_dollars(25));
    assert_eq!(requests[0].total, Money::from_dollars(27));
}

#[tokio::test]
async fn partial_selection_leaves_the_rest_in_the_cart() {
    let (store, _) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::succeeding_with("order-7"),
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, Some("M"))))
        .await
        .unwrap();
    store
        .send(CartAction::AddItem(input("2", 5, None)))
        .await
        .unwrap();

    let selected = vec![ItemKey::of("1").with_size("M")];
    store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys: selected },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].key, ItemKey::of("2"));
    assert_eq!(state.total_amount(), Money::from_dollars(5));
}

#[tokio::test]
async fn failed_submission_keeps_the_cart_and_allows_retry() {
    let orders = MockOrderSubmissionService::new();
    orders.push_response(Err(SubmissionError::Network {
        reason: "connection reset".to_string(),
    }));
    orders.push_response(Ok(OrderConfirmation {
        order_id: OrderId::new("order-8"),
    }));
    let (store, _) = store_with(
        MockSessionStore::authenticated("token-1"),
        orders,
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;

    let outcome = store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys: keys.clone() },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, CartAction::SubmissionFailed { .. }));

    let state = store.state(Clone::clone).await;
    assert_eq!(state.items.len(), 1, "failure must not lose cart data");
    assert!(matches!(state.submission, SubmissionStatus::Failed { .. }));

    // Retry the identical selection
    let outcome = store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, CartAction::SubmissionSucceeded { .. }));
    assert!(store.state(|s| s.items.is_empty()).await);
}

#[tokio::test]
async fn rejected_submission_surfaces_the_service_reason_and_keeps_the_cart() {
    let (store, _) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::failing_with(SubmissionError::Rejected {
            reason: "item sku-1 out of stock".to_string(),
        }),
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;

    let outcome = store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, CartAction::SubmissionFailed { .. }));

    let state = store.state(Clone::clone).await;
    assert_eq!(state.items.len(), 1, "rejection must not lose cart data");
    assert_eq!(state.total_amount(), Money::from_dollars(10));
    assert_eq!(
        state.submission,
        SubmissionStatus::Failed {
            error: CartError::SubmissionRejected {
                reason: "item sku-1 out of stock".to_string()
            }
        }
    );
    // A service rejection is final until the caller changes something
    assert!(!state.last_error.unwrap().is_retryable());
}

#[tokio::test]
async fn missing_session_token_fails_synchronously() {
    let (store, orders) = store_with(
        MockSessionStore::anonymous(),
        MockOrderSubmissionService::succeeding_with("order-1"),
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;
    store.send(CartAction::SubmitSelection { keys }).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(
        state.submission,
        SubmissionStatus::Failed {
            error: CartError::MissingSessionToken
        }
    );
    assert!(orders.requests().is_empty());
}

#[tokio::test]
async fn overlapping_submissions_are_rejected_while_the_first_completes() {
    let (store, orders) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::succeeding_with("order-1")
            .with_delay(Duration::from_millis(200)),
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;

    let mut rx = store.subscribe_actions();
    store
        .send(CartAction::SubmitSelection { keys: keys.clone() })
        .await
        .unwrap();
    assert!(store.state(CartState::is_submitting).await);

    // Second request while the first is still in flight
    store.send(CartAction::SubmitSelection { keys }).await.unwrap();
    let state = store.state(Clone::clone).await;
    assert_eq!(state.last_error, Some(CartError::SubmissionInProgress));
    assert!(state.is_submitting(), "in-flight status must survive");

    // The first submission still completes normally
    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let action = rx.recv().await.unwrap();
            if is_terminal(&action) {
                return action;
            }
        }
    })
    .await
    .unwrap();
    assert!(matches!(outcome, CartAction::SubmissionSucceeded { .. }));
    assert_eq!(orders.requests().len(), 1, "only one order may be placed");
    assert!(store.state(|s| s.items.is_empty()).await);
}

#[tokio::test]
async fn fee_outage_defaults_to_zero_fee() {
    let (store, orders) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::succeeding_with("order-1"),
        MockDeliveryFeeProvider::unavailable("fee service down"),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;
    store
        .send_and_wait_for(
            CartAction::SubmitSelection { keys },
            is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let requests = orders.requests();
    assert_eq!(requests[0].delivery_fee, Money::ZERO);
    assert_eq!(requests[0].total, requests[0].subtotal);
}

#[tokio::test]
async fn shutdown_waits_for_the_submission_effect() {
    let (store, _) = store_with(
        MockSessionStore::authenticated("token-1"),
        MockOrderSubmissionService::succeeding_with("order-1")
            .with_delay(Duration::from_millis(100)),
        MockDeliveryFeeProvider::flat(Money::ZERO),
    );

    store
        .send(CartAction::AddItem(input("1", 10, None)))
        .await
        .unwrap();
    let keys = store.state(|s| s.all_keys()).await;
    store.send(CartAction::SubmitSelection { keys }).await.unwrap();

    store.shutdown(Duration::from_secs(5)).await.unwrap();

    assert!(matches!(
        store.send(CartAction::ClearCart).await,
        Err(cartflow_runtime::StoreError::ShutdownInProgress)
    ));
}
