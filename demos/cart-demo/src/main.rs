//! Scripted cart walkthrough.
//!
//! Builds a cart against in-memory providers, submits a selection, and shows
//! the two-phase outcome handling: the cart only changes once the success
//! action comes back.
//!
//! ```bash
//! cargo run --bin cart-demo
//! ```
//!
//! Set `RUST_LOG=debug` to watch every reduction.

use cartflow_cart::mocks::{MockDeliveryFeeProvider, MockOrderSubmissionService, MockSessionStore};
use cartflow_cart::{
    CartAction, CartEnvironment, CartItemInput, CartReducer, CartState, Money, ProductId,
};
use cartflow_core::environment::SystemClock;
use cartflow_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn catalog_item(id: &str, name: &str, price: Money, size: Option<&str>) -> CartItemInput {
    CartItemInput {
        product_id: ProductId::new(id),
        name: name.to_string(),
        unit_price: price,
        image: format!("{id}.png"),
        size: size.map(str::to_string),
        color: None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("=== Cart walkthrough ===");

    let env = CartEnvironment::new(
        Arc::new(MockSessionStore::authenticated("demo-session")),
        Arc::new(
            MockOrderSubmissionService::succeeding_with("order-1001")
                .with_delay(Duration::from_millis(300)),
        ),
        Arc::new(MockDeliveryFeeProvider::flat(Money::from_cents(499))),
        Arc::new(SystemClock),
    );
    let store = Store::new(CartState::new(), CartReducer, env);

    // Fill the cart; a repeated add merges into the existing line
    let hoodie = catalog_item("sku-401", "Hoodie", Money::from_cents(5900), Some("M"));
    store.send(CartAction::AddItem(hoodie.clone())).await?;
    store.send(CartAction::AddItem(hoodie.clone())).await?;
    store
        .send(CartAction::AddItem(catalog_item(
            "sku-108",
            "Beanie",
            Money::from_cents(1900),
            None,
        )))
        .await?;

    let (count, total) = store.state(|s| (s.item_count(), s.total_amount())).await;
    info!(units = count, %total, "cart filled");

    // Submit only the hoodie line and wait for the terminal outcome
    let outcome = store
        .send_and_wait_for(
            CartAction::SubmitSelection {
                keys: vec![hoodie.key()],
            },
            |a| {
                matches!(
                    a,
                    CartAction::SubmissionSucceeded { .. } | CartAction::SubmissionFailed { .. }
                )
            },
            Duration::from_secs(10),
        )
        .await?;

    match outcome {
        CartAction::SubmissionSucceeded { order_id, .. } => {
            info!(%order_id, "order placed");
        }
        CartAction::SubmissionFailed { error } => {
            info!(%error, "submission failed; cart left intact");
        }
        _ => {}
    }

    let (remaining, total) = store.state(|s| (s.items.len(), s.total_amount())).await;
    info!(lines = remaining, %total, "cart after submission");

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
