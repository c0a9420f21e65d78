//! Per-client session tokens.
//!
//! A provider answers "who signed in"; the token table answers "which
//! client is that". Every successful sign-in gets its own random token, so
//! one client signing in never opens the editor to another.

use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::Session;

/// Cookie carrying the token for browser clients.
pub const SESSION_COOKIE: &str = "labelkit_session";

#[derive(Debug, Default)]
pub struct SessionTokens {
    tokens: RwLock<HashMap<Uuid, Session>>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session under a fresh token.
    pub fn issue(&self, session: Session) -> Uuid {
        let token = Uuid::new_v4();
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token, session);
        }
        token
    }

    pub fn lookup(&self, token: Uuid) -> Option<Session> {
        self.tokens.read().ok()?.get(&token).cloned()
    }

    /// Forget a token, returning the session it held.
    pub fn revoke(&self, token: Uuid) -> Option<Session> {
        self.tokens.write().ok()?.remove(&token)
    }

    pub fn len(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
