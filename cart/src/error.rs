//! Cart error types.

use crate::providers::SubmissionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by cart operations.
///
/// Serializable so failed submissions can be recorded in
/// [`SubmissionStatus::Failed`](crate::state::SubmissionStatus) and compared
/// in tests.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CartError {
    /// Submission was attempted with no selected lines (or a selection that
    /// matches nothing in the cart)
    #[error("no items selected for submission")]
    EmptySelection,

    /// No valid session token was available; the caller should route the
    /// user to login
    #[error("no session token available")]
    MissingSessionToken,

    /// The remote order service rejected the submission
    #[error("order submission rejected: {reason}")]
    SubmissionRejected {
        /// Reason reported by the remote service
        reason: String,
    },

    /// The submission could not reach the remote service
    #[error("order submission failed: {reason}")]
    NetworkFailure {
        /// Underlying transport error description
        reason: String,
    },

    /// A submission is already in flight; the new request was discarded
    #[error("a submission is already in progress")]
    SubmissionInProgress,
}

impl CartError {
    /// Whether recovering from this error requires (re)authentication
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::MissingSessionToken)
    }

    /// Whether retrying the same submission may succeed without the caller
    /// changing anything first
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }
}

impl From<SubmissionError> for CartError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Rejected { reason } => Self::SubmissionRejected { reason },
            SubmissionError::Network { reason } => Self::NetworkFailure { reason },
        }
    }
}

/// Result alias for cart operations
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_errors_map_to_cart_errors() {
        let rejected: CartError = SubmissionError::Rejected {
            reason: "out of stock".to_string(),
        }
        .into();
        assert_eq!(
            rejected,
            CartError::SubmissionRejected {
                reason: "out of stock".to_string()
            }
        );
        assert!(!rejected.is_retryable());

        let network: CartError = SubmissionError::Network {
            reason: "timeout".to_string(),
        }
        .into();
        assert!(network.is_retryable());
    }

    #[test]
    fn missing_token_requires_login() {
        assert!(CartError::MissingSessionToken.requires_login());
        assert!(!CartError::EmptySelection.requires_login());
    }
}
