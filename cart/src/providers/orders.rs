//! Order submission service.

use crate::providers::SessionToken;
use crate::state::{ItemKey, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Order identifier assigned by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an `OrderId` from its string form
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fulfillment status of an order line in the submission payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Newly submitted, awaiting fulfillment
    Pending,
}

/// One line of an order submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Composite key of the cart line this was built from
    pub key: ItemKey,
    /// Display name at time of submission
    pub name: String,
    /// Price per unit at time of submission
    pub unit_price: Money,
    /// Units ordered
    pub quantity: u32,
    /// Initial fulfillment status; always [`LineStatus::Pending`] on
    /// submission
    pub status: LineStatus,
}

/// Payload sent to the remote order service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmissionRequest {
    /// Lines being ordered
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals, excluding the delivery fee
    pub subtotal: Money,
    /// Delivery fee applied to this order
    pub delivery_fee: Money,
    /// Amount charged: subtotal plus delivery fee
    pub total: Money,
    /// When the submission was initiated
    pub submitted_at: DateTime<Utc>,
}

/// Response from a successful submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Identifier the service assigned to the new order
    pub order_id: OrderId,
}

/// Errors from the order submission transport.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The service received the request and turned it down
    #[error("submission rejected: {reason}")]
    Rejected {
        /// Reason reported by the service
        reason: String,
    },
    /// The request never completed (connectivity, timeout)
    #[error("network failure: {reason}")]
    Network {
        /// Underlying transport error description
        reason: String,
    },
}

/// Remote order submission.
///
/// Implementations perform the actual network call. Uses explicit boxed
/// futures to stay dyn-compatible, so environments can hold
/// `Arc<dyn OrderSubmissionService>`.
pub trait OrderSubmissionService: Send + Sync {
    /// Submits an order on behalf of the session identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Rejected`] when the service declines the
    /// order and [`SubmissionError::Network`] when the request cannot
    /// complete.
    fn submit_order<'a>(
        &'a self,
        token: &'a SessionToken,
        request: OrderSubmissionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<OrderConfirmation, SubmissionError>> + Send + 'a>>;
}
