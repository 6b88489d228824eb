//! Explicit authentication session.
//!
//! The bearer token is held by a [`Session`] that is created once and handed to
//! the HTTP client at construction. Logging in calls [`Session::init`], logging
//! out calls [`Session::teardown`]; clones share the same token.

use crate::error::ApiError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the current bearer token
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// Create a session with no active token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already logged in
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.init(token);
        session
    }

    /// Start the session with `token` (on login)
    ///
    /// Replaces any previous token. Blank tokens are ignored.
    pub fn init(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            tracing::warn!("Ignoring blank session token");
            return;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::debug!("Session initialised");
    }

    /// End the session (on logout)
    pub fn teardown(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("Session torn down");
    }

    /// Whether a token is present
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The `Authorization` header value for the current token
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when there is no active session.
    pub fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::Unauthenticated)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_teardown() {
        let session = Session::new();
        assert_eq!(session.bearer(), Err(ApiError::Unauthenticated));

        session.init("abc");
        assert_eq!(session.bearer(), Ok("Bearer abc".to_string()));

        session.teardown();
        assert!(!session.is_active());
    }

    #[test]
    fn clones_share_the_token() {
        let session = Session::new();
        let client_copy = session.clone();

        session.init("shared");
        assert!(client_copy.is_active());
    }

    #[test]
    fn blank_token_is_ignored() {
        let session = Session::new();
        session.init("   ");
        assert!(!session.is_active());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let session = Session::with_token("secret-token");
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
