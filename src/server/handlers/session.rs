//! Session handlers.
//!
//! Sign-in hands the client a token twice: as an `HttpOnly` cookie for the
//! browser editor, and in the body for scripts that send
//! `Authorization: Bearer <token>`.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::{AccessPolicy, Credentials, SESSION_COOKIE, Session};

use super::super::state::AppState;
use super::{ApiError, client_session, session_token};

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub policy: AccessPolicy,
    pub session: Option<Session>,
    /// Whether the label endpoints are open to this client right now.
    pub permitted: bool,
    /// Only set in the sign-in response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Uuid>,
}

impl SessionView {
    fn new(policy: AccessPolicy, session: Option<Session>) -> Self {
        Self {
            policy,
            permitted: policy.permits(session.as_ref()),
            session,
            token: None,
        }
    }
}

fn session_cookie(token: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Strict", SESSION_COOKIE, token)
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0", SESSION_COOKIE)
}

/// GET /api/session
pub async fn get(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<SessionView> {
    Json(SessionView::new(state.policy, client_session(&state, &headers)))
}

/// POST /api/session/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, ApiError> {
    let session = match state.sessions.sign_in(credentials).await {
        Ok(session) => session,
        Err(SessionError::Rejected(msg)) => {
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, msg));
        }
        Err(e @ SessionError::Unavailable(_)) => {
            return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
        }
    };

    let token = state.tokens.issue(session.clone());
    tracing::debug!(email = %session.email, clients = state.tokens.len(), "session issued");

    let mut view = SessionView::new(state.policy, Some(session));
    view.token = Some(token);
    Ok(([(header::SET_COOKIE, session_cookie(token))], Json(view)).into_response())
}

/// POST /api/session/sign-out
///
/// Ends this client's session only. The provider is signed out once no
/// client holds a session any more.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let revoked = session_token(&headers).and_then(|token| state.tokens.revoke(token));

    if revoked.is_some() && state.tokens.is_empty() {
        state
            .sessions
            .sign_out()
            .await
            .map_err(|e| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    }

    let view = SessionView::new(state.policy, None);
    Ok(([(header::SET_COOKIE, expired_cookie())], Json(view)).into_response())
}
