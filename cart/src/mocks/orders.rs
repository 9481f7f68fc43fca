//! Scripted order submission service.

use crate::providers::{
    OrderConfirmation, OrderId, OrderSubmissionRequest, OrderSubmissionService, SessionToken,
    SubmissionError,
};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Order submission service that replays scripted responses.
///
/// Responses are consumed in order; every request is recorded for assertion.
/// An optional delay simulates network latency so overlapping-submission
/// behavior can be exercised.
#[derive(Debug, Default)]
pub struct MockOrderSubmissionService {
    responses: Mutex<VecDeque<Result<OrderConfirmation, SubmissionError>>>,
    requests: Mutex<Vec<OrderSubmissionRequest>>,
    delay: Option<Duration>,
}

impl MockOrderSubmissionService {
    /// Creates a service with no scripted responses
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that confirms every submission with `order_id`
    #[must_use]
    pub fn succeeding_with(order_id: impl Into<String>) -> Self {
        let service = Self::new();
        let id = OrderId::new(order_id);
        // Enough repeats for any test; VecDeque refuses nothing
        for _ in 0..16 {
            service.push_response(Ok(OrderConfirmation {
                order_id: id.clone(),
            }));
        }
        service
    }

    /// Creates a service that fails every submission with `error`
    #[must_use]
    pub fn failing_with(error: SubmissionError) -> Self {
        let service = Self::new();
        for _ in 0..16 {
            service.push_response(Err(error.clone()));
        }
        service
    }

    /// Adds latency before each response
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues the next response
    pub fn push_response(&self, response: Result<OrderConfirmation, SubmissionError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// All requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<OrderSubmissionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderSubmissionService for MockOrderSubmissionService {
    fn submit_order<'a>(
        &'a self,
        _token: &'a SessionToken,
        request: OrderSubmissionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<OrderConfirmation, SubmissionError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| {
                    Err(SubmissionError::Network {
                        reason: "no scripted response".to_string(),
                    })
                })
        })
    }
}
