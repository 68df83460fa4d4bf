use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Number of characters in a generated session token.
const SESSION_TOKEN_LENGTH: usize = 32;

/// In-memory registry mapping opaque session tokens to authenticated
/// usernames. Shared across all request handlers; mutation only happens
/// through [`create`](Self::create) and [`revoke`](Self::revoke).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh random token bound to `username`. A username may hold
    /// several live tokens at once.
    pub fn create(&self, username: &str) -> String {
        let token = nanoid::nanoid!(SESSION_TOKEN_LENGTH);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), username.to_string());
        token
    }

    /// Resolve a token to the username it was issued for.
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Drop a token. Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}
