/**
 * Local Auth Provider
 * bcrypt-verified accounts held in memory, for LOCAL_BACKEND mode and tests
 */
use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthError, AuthProvider, AuthUser, Session, SignUpOutcome};

/// Password used when no LOCAL_ADMIN_HASH_PASSWORD is configured
const FALLBACK_ADMIN_PASSWORD: &str = "admin123";

const MIN_PASSWORD_LEN: usize = 6;

/// Access token lifetime in seconds
const ACCESS_TOKEN_EXPIRY_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    password_hash: String,
    confirmed: bool,
}

impl Account {
    fn user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: self.email.clone(),
            email_confirmed: self.confirmed,
        }
    }
}

#[derive(Debug, Clone)]
struct IssuedToken {
    email: String,
    expires_at: DateTime<Utc>,
}

pub struct LocalProvider {
    accounts: RwLock<HashMap<String, Account>>,
    access_tokens: RwLock<HashMap<String, IssuedToken>>,
    /// refresh token -> (email, paired access token)
    refresh_tokens: RwLock<HashMap<String, (String, String)>>,
    token_lifetime: Duration,
}

fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 48)
}

fn invalid_credentials() -> AuthError {
    AuthError::Rejected("Invalid login credentials".to_string())
}

impl LocalProvider {
    /// Provider holding just the configured admin account, which counts as confirmed.
    pub fn new(admin_email: &str, admin_password_hash: Option<String>) -> Result<Self, AuthError> {
        let password_hash = match admin_password_hash {
            Some(h) => h,
            None => {
                tracing::warn!(
                    "SECURITY: LOCAL_ADMIN_HASH_PASSWORD is not set. \
                     The local admin falls back to the insecure default password '{}'. \
                     Generate a hash with `cargo run --bin hash-password <PASSWORD>`.",
                    FALLBACK_ADMIN_PASSWORD
                );
                hash(FALLBACK_ADMIN_PASSWORD, DEFAULT_COST)
                    .map_err(|e| AuthError::Request(e.to_string()))?
            }
        };
        Ok(Self::with_account(admin_email, &password_hash, true))
    }

    pub fn with_account(email: &str, password_hash: &str, confirmed: bool) -> Self {
        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            confirmed,
        };
        let mut accounts = HashMap::new();
        accounts.insert(account.email.clone(), account);
        Self {
            accounts: RwLock::new(accounts),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            access_tokens: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(HashMap::new()),
            token_lifetime: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
        }
    }

    /// Override how long issued access tokens stay valid.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Mark a signed-up account as confirmed. Returns `false` for unknown emails.
    pub async fn confirm(&self, email: &str) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&email.trim().to_lowercase()) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    async fn issue(&self, account: &Account) -> Session {
        let access_token = generate_token();
        let refresh_token = generate_token();
        let expires_at = Utc::now() + self.token_lifetime;

        self.access_tokens.write().await.insert(
            access_token.clone(),
            IssuedToken {
                email: account.email.clone(),
                expires_at,
            },
        );
        self.refresh_tokens.write().await.insert(
            refresh_token.clone(),
            (account.email.clone(), access_token.clone()),
        );

        Session {
            access_token,
            refresh_token,
            expires_at,
            user: account.user(),
        }
    }
}

#[async_trait]
impl AuthProvider for LocalProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Rejected(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password should be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        if self.accounts.read().await.contains_key(&email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }

        // bcrypt is CPU-bound; keep it off the async executor
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
            confirmed: false,
        };
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }
        accounts.insert(email.clone(), account);
        tracing::info!(email = %email, "local account registered, awaiting confirmation");
        Ok(SignUpOutcome::PendingConfirmation)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        let account = match self.accounts.read().await.get(&email) {
            Some(account) => account.clone(),
            None => return Err(invalid_credentials()),
        };

        let password = password.to_string();
        let stored = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?
            .unwrap_or(false);
        if !valid {
            tracing::warn!(email = %email, "local sign-in rejected");
            return Err(invalid_credentials());
        }
        if !account.confirmed {
            return Err(AuthError::Rejected("Email not confirmed".to_string()));
        }

        Ok(self.issue(&account).await)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.access_tokens.write().await.remove(access_token);
        self.refresh_tokens
            .write()
            .await
            .retain(|_, (_, paired)| paired != access_token);
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let Some((email, old_access)) = self.refresh_tokens.write().await.remove(refresh_token)
        else {
            return Err(AuthError::Rejected(
                "Invalid Refresh Token: Refresh Token Not Found".to_string(),
            ));
        };
        self.access_tokens.write().await.remove(&old_access);

        let account = self
            .accounts
            .read()
            .await
            .get(&email)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("User not found".to_string()))?;
        Ok(self.issue(&account).await)
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let issued = self
            .access_tokens
            .read()
            .await
            .get(access_token)
            .cloned()
            .filter(|t| t.expires_at > Utc::now())
            .ok_or_else(|| AuthError::Rejected("Invalid or expired session".to_string()))?;

        self.accounts
            .read()
            .await
            .get(&issued.email)
            .map(Account::user)
            .ok_or_else(|| AuthError::Rejected("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalProvider {
        let hash = bcrypt::hash("s3cret-pass", 4).unwrap();
        LocalProvider::with_account("Admin@IMA.test", &hash, true)
    }

    #[tokio::test]
    async fn test_sign_in_with_valid_credentials() {
        let p = provider();
        let session = p.sign_in("admin@ima.test", "s3cret-pass").await.unwrap();
        assert_eq!(session.user.email, "admin@ima.test");
        assert!(!session.is_expired());

        let user = p.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_share_message() {
        let p = provider();
        let wrong = p.sign_in("admin@ima.test", "nope").await.unwrap_err();
        let unknown = p.sign_in("ghost@ima.test", "nope").await.unwrap_err();
        assert_eq!(wrong.to_string(), "Invalid login credentials");
        assert_eq!(unknown.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_sign_up_requires_confirmation() {
        let p = provider();
        let outcome = p.sign_up("new@ima.test", "password1").await.unwrap();
        assert_eq!(outcome, SignUpOutcome::PendingConfirmation);

        let err = p.sign_in("new@ima.test", "password1").await.unwrap_err();
        assert_eq!(err.to_string(), "Email not confirmed");

        assert!(p.confirm("new@ima.test").await);
        assert!(p.sign_in("new@ima.test", "password1").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicates_and_short_passwords() {
        let p = provider();
        let dup = p.sign_up("admin@ima.test", "password1").await.unwrap_err();
        assert_eq!(dup.to_string(), "User already registered");

        let short = p.sign_up("x@ima.test", "123").await.unwrap_err();
        assert!(short.to_string().contains("at least 6"));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_access_token() {
        let p = provider();
        let session = p.sign_in("admin@ima.test", "s3cret-pass").await.unwrap();
        p.sign_out(&session.access_token).await.unwrap();
        assert!(p.get_user(&session.access_token).await.is_err());
        assert!(p.refresh(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let p = provider().with_token_lifetime(Duration::seconds(-1));
        let session = p.sign_in("admin@ima.test", "s3cret-pass").await.unwrap();
        assert!(session.is_expired());
        assert!(p.get_user(&session.access_token).await.is_err());

        let refreshed = p.refresh(&session.refresh_token).await.unwrap();
        assert_ne!(refreshed.refresh_token, session.refresh_token);
        // old refresh token is single-use
        assert!(p.refresh(&session.refresh_token).await.is_err());
    }
}
