/*!
 * HTTP-edge errors
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::db::StoreError;

/// Shown for any persistence failure; details go to the log only.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Backend is not configured")]
    NotConfigured,

    #[error(transparent)]
    Auth(AuthError),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotConfigured => AppError::NotConfigured,
            other => AppError::Store(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured => AppError::NotConfigured,
            other => AppError::Auth(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show an end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(_) => GENERIC_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Store(e) = &self {
            tracing::error!(error = %e, "persistence failure");
        }
        let status = self.status();
        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: Some(self.user_message()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(StoreError::NotConfigured).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(AuthError::NotConfigured).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(AuthError::Rejected("Invalid login credentials".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("Portfolio item".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::Request("timeout".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_persistence_errors_hide_details() {
        let err = AppError::from(StoreError::Rejected {
            status: 409,
            message: "duplicate key value violates unique constraint".into(),
        });
        assert_eq!(err.user_message(), GENERIC_ERROR);
    }

    #[test]
    fn test_auth_errors_pass_provider_message_through() {
        let err = AppError::from(AuthError::Rejected("Email not confirmed".into()));
        assert_eq!(err.user_message(), "Email not confirmed");
    }
}
