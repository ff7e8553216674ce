/*!
 * Auth Module
 * Sign-in, sign-up and session refresh against the configured identity provider
 */
pub mod gotrue;
pub mod local;
pub mod session;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

pub use gotrue::GoTrueProvider;
pub use local::LocalProvider;
pub use session::SessionRegistry;

const EVENT_CAPACITY: usize = 64;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Tokens issued by the provider for one signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Account created, confirmation link sent
    PendingConfirmation,
    /// Provider has confirmation disabled and signed the user straight in
    SignedIn(Session),
}

/// Session-change notification
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut { user_id: String },
    TokenRefreshed { user_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication is not configured")]
    NotConfigured,

    /// Provider's own message, shown to the user verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Auth request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

// ============================================================================
// Service
// ============================================================================

/// Handle passed to the login page and the admin gate.
#[derive(Clone)]
pub enum AuthService {
    Configured {
        provider: Arc<dyn AuthProvider>,
        events: broadcast::Sender<AuthEvent>,
    },
    Unconfigured,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthService::Configured { .. } => write!(f, "AuthService::Configured"),
            AuthService::Unconfigured => write!(f, "AuthService::Unconfigured"),
        }
    }
}

impl AuthService {
    pub fn configured(provider: impl AuthProvider + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        AuthService::Configured {
            provider: Arc::new(provider),
            events,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, AuthService::Configured { .. })
    }

    /// Stream of session changes. Closed immediately when unconfigured.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        match self {
            AuthService::Configured { events, .. } => events.subscribe(),
            AuthService::Unconfigured => broadcast::channel(1).1,
        }
    }

    fn provider(&self) -> Result<&Arc<dyn AuthProvider>, AuthError> {
        match self {
            AuthService::Configured { provider, .. } => Ok(provider),
            AuthService::Unconfigured => Err(AuthError::NotConfigured),
        }
    }

    fn emit(&self, event: AuthEvent) {
        if let AuthService::Configured { events, .. } = self {
            // No subscribers is fine
            let _ = events.send(event);
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.provider()?.sign_up(email.trim(), password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            tracing::info!(user = %session.user.email, "admin signed up and signed in");
            self.emit(AuthEvent::SignedIn {
                user_id: session.user.id.clone(),
            });
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.provider()?.sign_in(email.trim(), password).await?;
        tracing::info!(user = %session.user.email, "admin signed in");
        self.emit(AuthEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    /// Revoke the session upstream. Subscribers hear about it even when the
    /// provider call fails, so the local session never outlives a logout.
    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let result = self.provider()?.sign_out(&session.access_token).await;
        self.emit(AuthEvent::SignedOut {
            user_id: session.user.id.clone(),
        });
        result
    }

    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let refreshed = self.provider()?.refresh(&session.refresh_token).await?;
        self.emit(AuthEvent::TokenRefreshed {
            user_id: refreshed.user.id.clone(),
        });
        Ok(refreshed)
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.provider()?.get_user(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn local() -> LocalProvider {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        LocalProvider::with_account("admin@ima.test", &hash, true)
    }

    #[tokio::test]
    async fn test_unconfigured_rejects_every_call() {
        let auth = AuthService::Unconfigured;
        assert!(!auth.is_configured());
        assert!(matches!(
            auth.sign_in("a@b.co", "pw").await,
            Err(AuthError::NotConfigured)
        ));
        assert!(matches!(
            auth.sign_up("a@b.co", "pw").await,
            Err(AuthError::NotConfigured)
        ));
        assert!(matches!(
            auth.get_user("token").await,
            Err(AuthError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_event_stream_is_closed() {
        let mut rx = AuthService::Unconfigured.subscribe();
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_and_out_emit_events() {
        let auth = AuthService::configured(local());
        let mut rx = auth.subscribe();

        let session = auth.sign_in(" admin@ima.test ", "correct horse").await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            AuthEvent::SignedIn {
                user_id: session.user.id.clone()
            }
        );

        auth.sign_out(&session).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            AuthEvent::SignedOut {
                user_id: session.user.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_emits_token_refreshed() {
        let auth = AuthService::configured(local());
        let session = auth.sign_in("admin@ima.test", "correct horse").await.unwrap();
        let mut rx = auth.subscribe();

        let refreshed = auth.refresh(&session).await.unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(matches!(
            rx.recv().await.unwrap(),
            AuthEvent::TokenRefreshed { .. }
        ));
    }

    #[test]
    fn test_session_expiry() {
        let session = Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
            user: AuthUser {
                id: "u".to_string(),
                email: "u@x.y".to_string(),
                email_confirmed: true,
            },
        };
        assert!(session.is_expired());
    }

    #[test]
    fn test_rejected_error_displays_raw_message() {
        let err = AuthError::Rejected("Invalid login credentials".to_string());
        assert_eq!(err.to_string(), "Invalid login credentials");
    }
}
