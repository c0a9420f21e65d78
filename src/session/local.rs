//! In-process identity provider.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use super::{Credentials, Session, SessionHandler, SessionProvider, Subscription};
use crate::error::SessionError;

type SharedHandler = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

/// Session provider that keeps its state in memory.
///
/// With an allow-list, only the listed emails (case-insensitive) may sign in.
/// Without one, any well-formed email is accepted.
pub struct LocalSessionProvider {
    allowed: Option<Vec<String>>,
    session: RwLock<Option<Session>>,
    handlers: Mutex<Vec<(u64, SharedHandler)>>,
    next_id: AtomicU64,
}

impl Default for LocalSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSessionProvider {
    pub fn new() -> Self {
        Self {
            allowed: None,
            session: RwLock::new(None),
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_allowed_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: Some(
                emails
                    .into_iter()
                    .map(|e| e.as_ref().trim().to_lowercase())
                    .collect(),
            ),
            ..Self::new()
        }
    }

    fn set_session(&self, session: Option<Session>) -> Result<(), SessionError> {
        {
            let mut current = self
                .session
                .write()
                .map_err(|_| SessionError::Unavailable("session lock poisoned".into()))?;
            *current = session.clone();
        }

        // Handlers may subscribe or unsubscribe, so run them unlocked.
        let handlers: Vec<_> = self
            .handlers
            .lock()
            .map_err(|_| SessionError::Unavailable("handler lock poisoned".into()))?
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(session.as_ref());
        }
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    fn current_session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn on_change(&self, handler: SessionHandler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push((id, Arc::from(handler)));
        }
        Subscription(id)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.retain(|(id, _)| *id != subscription.0);
        }
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<Session, SessionError> {
        let email = credentials.email.trim().to_lowercase();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(SessionError::Rejected(format!(
                "'{}' is not a valid email",
                credentials.email
            )));
        }

        if let Some(allowed) = &self.allowed
            && !allowed.contains(&email)
        {
            tracing::info!(email = %email, "sign-in rejected");
            return Err(SessionError::Rejected(format!("{} is not allowed", email)));
        }

        let session = Session {
            user_id: Uuid::new_v4(),
            email,
            signed_in_at: Utc::now(),
        };
        self.set_session(Some(session.clone()))?;
        tracing::info!(email = %session.email, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        if self.current_session().is_none() {
            return Ok(());
        }
        self.set_session(None)?;
        tracing::info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let provider = LocalSessionProvider::new();
        assert!(provider.current_session().is_none());

        let session = provider
            .sign_in(Credentials::email("Ops@Example.com"))
            .await
            .unwrap();
        assert_eq!(session.email, "ops@example.com");
        assert_eq!(provider.current_session(), Some(session));

        provider.sign_out().await.unwrap();
        assert!(provider.current_session().is_none());
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let provider = LocalSessionProvider::new();
        for bad in ["", "ops", "@example.com", "ops@localhost"] {
            assert!(matches!(
                provider.sign_in(Credentials::email(bad)).await,
                Err(SessionError::Rejected(_))
            ));
        }
        assert!(provider.current_session().is_none());
    }

    #[tokio::test]
    async fn test_allow_list() {
        let provider = LocalSessionProvider::with_allowed_emails(["ops@example.com"]);
        assert!(
            provider
                .sign_in(Credentials::email("intruder@example.com"))
                .await
                .is_err()
        );
        assert!(provider.current_session().is_none());
        assert!(
            provider
                .sign_in(Credentials::email("OPS@example.com"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_change_notifications() {
        let provider = LocalSessionProvider::new();
        let signed_in = Arc::new(AtomicUsize::new(0));
        let signed_out = Arc::new(AtomicUsize::new(0));

        let (a, b) = (signed_in.clone(), signed_out.clone());
        let sub = provider.on_change(Box::new(move |session| {
            if session.is_some() {
                a.fetch_add(1, Ordering::SeqCst);
            } else {
                b.fetch_add(1, Ordering::SeqCst);
            }
        }));

        provider
            .sign_in(Credentials::email("ops@example.com"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();
        // Already signed out: no notification
        provider.sign_out().await.unwrap();

        assert_eq!(signed_in.load(Ordering::SeqCst), 1);
        assert_eq!(signed_out.load(Ordering::SeqCst), 1);

        provider.unsubscribe(sub);
        provider
            .sign_in(Credentials::email("ops@example.com"))
            .await
            .unwrap();
        assert_eq!(signed_in.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_can_unsubscribe_itself() {
        let provider = Arc::new(LocalSessionProvider::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own = Arc::new(Mutex::new(None::<Subscription>));

        let (p, c, o) = (provider.clone(), calls.clone(), own.clone());
        let sub = provider.on_change(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = *o.lock().unwrap() {
                p.unsubscribe(sub);
            }
        }));
        *own.lock().unwrap() = Some(sub);

        provider
            .sign_in(Credentials::email("ops@example.com"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
