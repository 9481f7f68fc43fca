//! Delivery fee lookup.

use crate::state::Money;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from the delivery fee lookup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FeeError {
    /// The fee could not be determined
    #[error("delivery fee unavailable: {reason}")]
    Unavailable {
        /// Underlying error description
        reason: String,
    },
}

/// Delivery fee quotation for an order subtotal.
///
/// A lookup failure is not fatal to submission: the cart falls back to a
/// zero fee and proceeds.
pub trait DeliveryFeeProvider: Send + Sync {
    /// Quotes the delivery fee for an order with the given subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`FeeError::Unavailable`] when no quote can be produced.
    fn delivery_fee(
        &self,
        subtotal: Money,
    ) -> Pin<Box<dyn Future<Output = Result<Money, FeeError>> + Send + '_>>;
}
