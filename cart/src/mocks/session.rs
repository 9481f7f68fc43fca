//! In-memory session store.

use crate::providers::{SessionStore, SessionToken};
use std::sync::{Mutex, PoisonError};

/// Session store backed by an in-memory token slot.
#[derive(Debug, Default)]
pub struct MockSessionStore {
    token: Mutex<Option<SessionToken>>,
}

impl MockSessionStore {
    /// Creates a store holding a valid token
    #[must_use]
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SessionToken::new(token))),
        }
    }

    /// Creates a store with no session
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replaces the stored token
    pub fn set_token(&self, token: Option<SessionToken>) {
        *self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }
}

impl SessionStore for MockSessionStore {
    fn current_token(&self) -> Option<SessionToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
