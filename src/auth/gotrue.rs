/**
 * GoTrue Provider
 * Hosted auth service at {SUPABASE_URL}/auth/v1
 */
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{header, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AuthError, AuthProvider, AuthUser, Session, SignUpOutcome};

const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    confirmed_at: Option<DateTime<Utc>>,
}

impl From<UserResponse> for AuthUser {
    fn from(user: UserResponse) -> Self {
        AuthUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            email_confirmed: user.email_confirmed_at.is_some() || user.confirmed_at.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(token.expires_in));
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user.into(),
        }
    }
}

/// Pull the human-readable message out of a GoTrue error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

// ============================================================================
// Provider
// ============================================================================

pub struct GoTrueProvider {
    client: reqwest::Client,
    base: String,
    anon_key: String,
}

impl GoTrueProvider {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base: format!("{}/auth/v1", url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}/{}", self.base, path))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response, AuthError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "auth request failed");
            AuthError::Request(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::warn!(path = %path, status = %status, message = %message, "auth service rejected request");
        Err(AuthError::Rejected(message))
    }

    async fn json(&self, response: Response) -> Result<Value, AuthError> {
        response.json::<Value>().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse auth response");
            AuthError::Request(e.to_string())
        })
    }

    async fn token(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let builder = self
            .request(Method::POST, "token", None)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let value = self.json(self.send("token", builder).await?).await?;
        let token: TokenResponse =
            serde_json::from_value(value).map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(token.into())
    }
}

#[async_trait]
impl AuthProvider for GoTrueProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let builder = self
            .request(Method::POST, "signup", None)
            .json(&json!({ "email": email, "password": password }));
        let value = self.json(self.send("signup", builder).await?).await?;

        // With confirmations on, only the user object comes back
        if value.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(value).map_err(|e| AuthError::Request(e.to_string()))?;
            Ok(SignUpOutcome::SignedIn(token.into()))
        } else {
            Ok(SignUpOutcome::PendingConfirmation)
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let builder = self.request(Method::POST, "logout", Some(access_token));
        self.send("logout", builder).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let builder = self.request(Method::GET, "user", Some(access_token));
        let value = self.json(self.send("user", builder).await?).await?;
        let user: UserResponse =
            serde_json::from_value(value).map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(user.into())
    }
}
