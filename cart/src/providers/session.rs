//! Session token access.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token authenticating the current user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from its string form
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(***)")
    }
}

/// Read access to the current session.
///
/// Lookup is synchronous: session material is expected to already be in
/// memory (or an equivalently cheap local store) by the time the cart needs
/// it.
pub trait SessionStore: Send + Sync {
    /// Returns the current session token, or `None` when the user is not
    /// authenticated
    fn current_token(&self) -> Option<SessionToken>;
}
