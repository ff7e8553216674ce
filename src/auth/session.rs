/**
 * Admin Sessions
 * Cookie-keyed registry of signed-in admins and their unsaved screen drafts
 */
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, RwLock};

use super::{AuthEvent, Session};
use crate::admin::Draft;

pub const SESSION_COOKIE: &str = "ima_session";

const TOKEN_LEN: usize = 64;

pub struct AdminSession {
    pub session: Session,
    pub last_seen: DateTime<Utc>,
    /// Unsaved edits of the one screen currently open
    pub draft: Option<Draft>,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, AdminSession>>,
    ttl: Duration,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LEN)
}

/// Only the SHA-256 of a cookie token is kept in memory.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Read the session token from the request's Cookie header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/admin; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(secure: bool) -> String {
    session_cookie("", Duration::zero(), secure)
}

// ============================================================================
// Registry
// ============================================================================

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a freshly signed-in session and return its cookie token.
    pub async fn create(&self, session: Session) -> String {
        let swept = self.sweep().await;
        if swept > 0 {
            tracing::debug!(swept, "dropped idle admin sessions");
        }

        let token = generate_token();
        let now = Utc::now();
        self.sessions.write().await.insert(
            hash_token(&token),
            AdminSession {
                session,
                last_seen: now,
                draft: None,
            },
        );
        token
    }

    /// Provider session behind a cookie token, marking it as seen. Idle
    /// sessions past the TTL are dropped and yield `None`.
    pub async fn touch(&self, token: &str) -> Option<Session> {
        let key = hash_token(token);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&key)?;
        if now - entry.last_seen >= self.ttl {
            sessions.remove(&key);
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Swap in refreshed provider tokens.
    pub async fn replace_session(&self, token: &str, session: Session) -> bool {
        match self.sessions.write().await.get_mut(&hash_token(token)) {
            Some(entry) => {
                entry.session = session;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, token: &str) -> Option<Session> {
        self.sessions
            .write()
            .await
            .remove(&hash_token(token))
            .map(|s| s.session)
    }

    /// Drop every session of one user. Returns how many were removed.
    pub async fn remove_user(&self, user_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.session.user.id != user_id);
        before - sessions.len()
    }

    /// Remove idle sessions past the TTL.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen < ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Take the open draft out of the session, leaving none behind.
    pub async fn take_draft(&self, token: &str) -> Option<Draft> {
        self.sessions
            .write()
            .await
            .get_mut(&hash_token(token))
            .and_then(|s| s.draft.take())
    }

    pub async fn put_draft(&self, token: &str, draft: Draft) {
        if let Some(entry) = self.sessions.write().await.get_mut(&hash_token(token)) {
            entry.draft = Some(draft);
        }
    }

    pub async fn clear_draft(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.get_mut(&hash_token(token)) {
            entry.draft = None;
        }
    }

    /// Apply session-change notifications until the auth service goes away.
    pub fn listen(self: Arc<Self>, mut events: broadcast::Receiver<AuthEvent>) {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SignedOut { user_id }) => {
                        let removed = self.remove_user(&user_id).await;
                        tracing::debug!(user_id = %user_id, removed, "dropped signed-out sessions");
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
