//! Fixed-outcome delivery fee provider.

use crate::providers::{DeliveryFeeProvider, FeeError};
use crate::state::Money;
use std::future::Future;
use std::pin::Pin;

/// Delivery fee provider that always yields the same outcome.
#[derive(Debug, Clone)]
pub struct MockDeliveryFeeProvider {
    result: Result<Money, FeeError>,
}

impl MockDeliveryFeeProvider {
    /// A provider quoting a flat fee regardless of subtotal
    #[must_use]
    pub const fn flat(fee: Money) -> Self {
        Self { result: Ok(fee) }
    }

    /// A provider whose lookup always fails
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            result: Err(FeeError::Unavailable {
                reason: reason.into(),
            }),
        }
    }
}

impl DeliveryFeeProvider for MockDeliveryFeeProvider {
    fn delivery_fee(
        &self,
        _subtotal: Money,
    ) -> Pin<Box<dyn Future<Output = Result<Money, FeeError>> + Send + '_>> {
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}
