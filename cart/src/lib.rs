//! # Cartflow Cart
//!
//! The shopping cart state core: a normalized collection of line items keyed
//! by a composite identity (product, size, color), with quantity mutation,
//! derived totals, selective checkout, and post-submission reconciliation.
//!
//! ## Architecture
//!
//! The cart is implemented as a reducer:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! All cart mutations are synchronous, in-memory, and total over composite
//! keys (a missing key is a no-op, never an error). The only suspension point
//! is order submission, which runs as a single [`Effect::Future`] and feeds
//! exactly one terminal action (`SubmissionSucceeded` or `SubmissionFailed`)
//! back into the reducer. While it is outstanding the cart's visible state is
//! unchanged - no optimistic mutation, so a failure leaves zero data loss.
//!
//! [`Effect::Future`]: cartflow_core::effect::Effect::Future
//!
//! ## Example: selective checkout
//!
//! ```rust,ignore
//! use cartflow_cart::*;
//!
//! // 1. Build the cart
//! let effects = reducer.reduce(&mut state, CartAction::AddItem(input), &env);
//!
//! // 2. Submit a selection
//! let effects = reducer.reduce(
//!     &mut state,
//!     CartAction::SubmitSelection { keys: vec![key] },
//!     &env,
//! );
//!
//! // 3. On success, exactly the submitted lines are removed
//! assert!(matches!(state.submission, SubmissionStatus::Succeeded { .. }));
//! ```

// Public modules
pub mod actions;
pub mod error;
pub mod mocks;
pub mod providers;
pub mod reducer;
pub mod state;

// Re-export main types for convenience
pub use actions::{CartAction, CartItemInput};
pub use error::{CartError, Result};
pub use providers::{
    DeliveryFeeProvider, FeeError, LineStatus, OrderConfirmation, OrderId, OrderLine,
    OrderSubmissionRequest, OrderSubmissionService, SessionStore, SessionToken, SubmissionError,
};
pub use reducer::{CartEnvironment, CartReducer};
pub use state::{
    toggle_select_all, CartItem, CartState, ItemKey, ItemStatus, Money, ProductId,
    SubmissionStatus,
};
