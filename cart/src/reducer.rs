//! Cart reducer - all cart business rules in one pure function.
//!
//! Mutations apply synchronously; the only asynchronous work is the order
//! submission round-trip, expressed as a single [`Effect::Future`] that feeds
//! exactly one terminal action (`SubmissionSucceeded` or `SubmissionFailed`)
//! back into the reducer.

use crate::actions::CartAction;
use crate::error::CartError;
use crate::providers::{
    DeliveryFeeProvider, LineStatus, OrderLine, OrderSubmissionRequest, OrderSubmissionService,
    SessionStore,
};
use crate::state::{CartItem, CartState, ItemKey, ItemStatus, Money, SubmissionStatus};
use cartflow_core::effect::Effect;
use cartflow_core::environment::Clock;
use cartflow_core::reducer::Reducer;
use cartflow_core::{SmallVec, smallvec};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Injected dependencies for the cart reducer.
#[derive(Clone)]
pub struct CartEnvironment {
    /// Read access to the current session
    pub session: Arc<dyn SessionStore>,
    /// Remote order submission
    pub orders: Arc<dyn OrderSubmissionService>,
    /// Delivery fee quotation
    pub fees: Arc<dyn DeliveryFeeProvider>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl CartEnvironment {
    /// Creates an environment from its collaborators
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionStore>,
        orders: Arc<dyn OrderSubmissionService>,
        fees: Arc<dyn DeliveryFeeProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session,
            orders,
            fees,
            clock,
        }
    }
}

/// The cart reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut CartState,
        action: CartAction,
        env: &CartEnvironment,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        match action {
            CartAction::AddItem(input) => {
                if input.unit_price < Money::ZERO {
                    warn!(
                        product_id = %input.product_id,
                        price_cents = input.unit_price.cents(),
                        "rejecting add with negative unit price"
                    );
                    return smallvec![];
                }
                let key = input.key();
                if let Some(pos) = state.position(&key) {
                    state.items[pos].quantity += 1;
                    debug!(key = ?key, quantity = state.items[pos].quantity, "merged into existing line");
                } else {
                    state.items.push(CartItem {
                        key: key.clone(),
                        name: input.name,
                        unit_price: input.unit_price,
                        image: input.image,
                        quantity: 1,
                        status: ItemStatus::InCart,
                    });
                    debug!(key = ?key, "added new line");
                }
                smallvec![]
            }

            CartAction::IncrementQuantity { key } => {
                if let Some(pos) = state.position(&key) {
                    state.items[pos].quantity += 1;
                } else {
                    debug!(key = ?key, "increment for unknown line ignored");
                }
                smallvec![]
            }

            CartAction::DecrementQuantity { key } => {
                if let Some(pos) = state.position(&key) {
                    if state.items[pos].quantity > 1 {
                        state.items[pos].quantity -= 1;
                    } else {
                        // Quantity never persists at zero: the line goes away
                        state.items.remove(pos);
                    }
                } else {
                    debug!(key = ?key, "decrement for unknown line ignored");
                }
                smallvec![]
            }

            CartAction::RemoveItem { key } => {
                if let Some(pos) = state.position(&key) {
                    state.items.remove(pos);
                } else {
                    debug!(key = ?key, "remove for unknown line ignored");
                }
                smallvec![]
            }

            CartAction::MarkRemoved { key } => {
                if let Some(pos) = state.position(&key) {
                    state.items[pos].status = ItemStatus::Removed;
                } else {
                    debug!(key = ?key, "tombstone for unknown line ignored");
                }
                smallvec![]
            }

            CartAction::ClearCart => {
                state.items.clear();
                state.submission = SubmissionStatus::Idle;
                state.last_error = None;
                smallvec![]
            }

            CartAction::SubmitSelection { keys } => self.submit_selection(state, keys, env),

            CartAction::SubmissionSucceeded {
                order_id,
                submitted,
            } => {
                if !state.is_submitting() {
                    warn!(order_id = %order_id, "success event with no submission in flight; ignored");
                    return smallvec![];
                }
                // Post-success removal is atomic with recording the outcome:
                // both happen inside this single reduction.
                state
                    .items
                    .retain(|item| !submitted.iter().any(|s| s.key == item.key));
                state.submission = SubmissionStatus::Succeeded { order_id };
                state.last_error = None;
                smallvec![]
            }

            CartAction::SubmissionFailed { error } => {
                if !state.is_submitting() {
                    warn!(%error, "failure event with no submission in flight; ignored");
                    return smallvec![];
                }
                // The collection is untouched so the caller can retry the
                // same selection.
                state.last_error = Some(error.clone());
                state.submission = SubmissionStatus::Failed { error };
                smallvec![]
            }
        }
    }
}

impl CartReducer {
    fn submit_selection(
        &self,
        state: &mut CartState,
        keys: Vec<ItemKey>,
        env: &CartEnvironment,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        if state.is_submitting() {
            // The in-flight status must survive; the rejection is only
            // observable through last_error.
            warn!("submission already in progress; discarding new request");
            state.last_error = Some(CartError::SubmissionInProgress);
            return smallvec![];
        }

        let selected: Vec<CartItem> = state
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::InCart && keys.contains(&item.key))
            .cloned()
            .collect();

        if selected.is_empty() {
            state.last_error = Some(CartError::EmptySelection);
            state.submission = SubmissionStatus::Failed {
                error: CartError::EmptySelection,
            };
            return smallvec![];
        }

        let Some(token) = env.session.current_token() else {
            state.last_error = Some(CartError::MissingSessionToken);
            state.submission = SubmissionStatus::Failed {
                error: CartError::MissingSessionToken,
            };
            return smallvec![];
        };

        let subtotal = Money::from_cents(
            selected
                .iter()
                .map(|item| item.line_total().cents())
                .sum(),
        );
        let lines: Vec<OrderLine> = selected
            .iter()
            .map(|item| OrderLine {
                key: item.key.clone(),
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                status: LineStatus::Pending,
            })
            .collect();

        // The lines leave the cart tagged as on the way; the snapshot rides
        // in the success action so removal matches exactly what was sent.
        let submitted: Vec<CartItem> = selected
            .into_iter()
            .map(|mut item| {
                item.status = ItemStatus::OnTheWay;
                item
            })
            .collect();

        state.last_error = None;
        state.submission = SubmissionStatus::Submitting {
            keys: submitted.iter().map(|item| item.key.clone()).collect(),
        };
        info!(
            lines = lines.len(),
            subtotal_cents = subtotal.cents(),
            "submitting order"
        );

        let orders = Arc::clone(&env.orders);
        let fees = Arc::clone(&env.fees);
        let submitted_at = env.clock.now();

        smallvec![Effect::future(async move {
            // A missing fee quote is not fatal: fall back to zero and submit.
            let delivery_fee = match fees.delivery_fee(subtotal).await {
                Ok(fee) => fee,
                Err(err) => {
                    warn!(%err, "delivery fee unavailable; defaulting to zero");
                    Money::ZERO
                }
            };

            let request = OrderSubmissionRequest {
                lines,
                subtotal,
                delivery_fee,
                total: subtotal.plus(delivery_fee),
                submitted_at,
            };

            match orders.submit_order(&token, request).await {
                Ok(confirmation) => {
                    info!(order_id = %confirmation.order_id, "order submitted");
                    Some(CartAction::SubmissionSucceeded {
                        order_id: confirmation.order_id,
                        submitted,
                    })
                }
                Err(err) => {
                    warn!(%err, "order submission failed");
                    Some(CartAction::SubmissionFailed { error: err.into() })
                }
            }
        })]
    }
}
