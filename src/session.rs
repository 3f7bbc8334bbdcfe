use std::collections::HashMap;
use std::sync::Mutex;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::state::AppState;

/// One authenticated browser session: created at login, removed at logout,
/// gone on restart.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub student_id: String,
    pub remember: bool,
    pub alert_sent: bool,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

// A token is only honored while its entry is alive here, so logout takes
// effect immediately even though the JWT stays well-formed until it expires.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, student_id: &str, remember: bool, ttl: Duration) -> Session {
        let now = OffsetDateTime::now_utc();
        let session = Session {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            remember,
            alert_sent: false,
            created_at: now,
            expires_at: now + ttl,
        };
        self.inner
            .lock()
            .expect("session registry lock poisoned")
            .insert(session.id, session.clone());
        debug!(session_id = %session.id, student_id, "session created");
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.inner.lock().expect("session registry lock poisoned");
        match sessions.get(&id) {
            Some(s) if s.expires_at <= OffsetDateTime::now_utc() => {
                sessions.remove(&id);
                None
            }
            Some(s) => Some(s.clone()),
            None => None,
        }
    }

    pub fn remove(&self, id: Uuid) -> Option<Session> {
        self.inner
            .lock()
            .expect("session registry lock poisoned")
            .remove(&id)
    }

    /// Returns `true` only for the caller that actually flipped the flag;
    /// check and flip share one lock acquisition.
    pub fn try_mark_alert_sent(&self, id: Uuid) -> bool {
        let mut sessions = self.inner.lock().expect("session registry lock poisoned");
        match sessions.get_mut(&id) {
            Some(s) if !s.alert_sent => {
                s.alert_sent = true;
                true
            }
            _ => false,
        }
    }
}

/// Extractor for authenticated routes: a valid bearer token whose session is
/// still alive in the registry.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub student_id: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let keys = JwtKeys::from_ref(&state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        ))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ));
            }
        };

        let Some(session) = state.sessions.get(claims.sid) else {
            warn!(session_id = %claims.sid, "token for a dead session");
            return Err((StatusCode::UNAUTHORIZED, "Session expired".to_string()));
        };

        Ok(SessionContext {
            session_id: session.id,
            student_id: session.student_id,
        })
    }
}
