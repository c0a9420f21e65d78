//! # Identity Session
//!
//! Optional sign-in gate in front of the label editor.
//!
//! The identity provider is an external collaborator behind the
//! [`SessionProvider`] trait: the core asks for the current session,
//! subscribes to changes, and triggers sign-in/sign-out. Whether a session is
//! required at all is deployment policy ([`AccessPolicy`]). A server with
//! several clients keeps each client's session under its own token
//! ([`SessionTokens`]).
//!
//! ## Example
//!
//! ```
//! use labelkit::session::{AccessPolicy, Credentials, LocalSessionProvider, SessionProvider};
//!
//! # tokio_test_block(async {
//! let provider = LocalSessionProvider::new();
//! let policy = AccessPolicy::SignInRequired;
//! assert!(!policy.permits(provider.current_session().as_ref()));
//!
//! provider.sign_in(Credentials::email("ops@example.com")).await.unwrap();
//! assert!(policy.permits(provider.current_session().as_ref()));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod local;
mod tokens;

pub use local::LocalSessionProvider;
pub use tokens::{SESSION_COOKIE, SessionTokens};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SessionError;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

/// What the user presents to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
}

impl Credentials {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Handle returned by [`SessionProvider::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

/// Called with the new session (or `None` after sign-out).
pub type SessionHandler = Box<dyn Fn(Option<&Session>) + Send + Sync>;

/// Identity provider boundary.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The session as of now, if signed in.
    fn current_session(&self) -> Option<Session>;

    /// Register a change handler. Handlers run synchronously on the task
    /// that caused the change.
    fn on_change(&self, handler: SessionHandler) -> Subscription;

    /// Drop a handler. Unknown subscriptions are ignored.
    fn unsubscribe(&self, subscription: Subscription);

    async fn sign_in(&self, credentials: Credentials) -> Result<Session, SessionError>;

    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Whether the editor needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    #[default]
    Open,
    SignInRequired,
}

impl AccessPolicy {
    pub fn permits(&self, session: Option<&Session>) -> bool {
        match self {
            Self::Open => true,
            Self::SignInRequired => session.is_some(),
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::SignInRequired => f.write_str("sign_in_required"),
        }
    }
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "sign_in_required" | "required" => Ok(Self::SignInRequired),
            other => Err(format!("Unknown access policy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_policy_permits_anyone() {
        assert!(AccessPolicy::Open.permits(None));
    }

    #[test]
    fn test_required_policy_needs_session() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "ops@example.com".into(),
            signed_in_at: Utc::now(),
        };
        assert!(!AccessPolicy::SignInRequired.permits(None));
        assert!(AccessPolicy::SignInRequired.permits(Some(&session)));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("open".parse(), Ok(AccessPolicy::Open));
        assert_eq!("required".parse(), Ok(AccessPolicy::SignInRequired));
        assert!("maybe".parse::<AccessPolicy>().is_err());
    }
}
