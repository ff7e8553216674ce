/**
 * Health Routes
 * Liveness, readiness and dependency status of the site
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::db::{self, StoreError};
use crate::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Healthy,
    Unhealthy,
    /// No credentials were given for the dependency
    Unconfigured,
    Ready,
    #[serde(rename = "not ready")]
    NotReady,
}

/// Single dependency check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: ServiceCheck,
    pub auth: ServiceCheck,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

async fn store_check(state: &AppState) -> ServiceCheck {
    match db::health_check(&state.data).await {
        Ok(duration) => ServiceCheck {
            status: HealthStatus::Healthy,
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(StoreError::NotConfigured) => ServiceCheck {
            status: HealthStatus::Unconfigured,
            response_time: None,
            error: Some("SUPABASE_URL / SUPABASE_ANON_KEY not set".to_string()),
        },
        Err(e) => ServiceCheck {
            status: HealthStatus::Unhealthy,
            response_time: None,
            error: Some(e.to_string()),
        },
    }
}

fn auth_check(state: &AppState) -> ServiceCheck {
    let status = if state.auth.is_configured() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unconfigured
    };
    ServiceCheck {
        status,
        response_time: None,
        error: None,
    }
}

/// GET /health - Simple health ping
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: HealthStatus::Ok,
    })
}

/// GET /health/detailed - Store and auth status
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    // Overall status stays "ok" while the process serves, configured or not
    let response = DetailedHealthResponse {
        status: HealthStatus::Ok,
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        checks: HealthChecks {
            store: store_check(&state).await,
            auth: auth_check(&state),
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Ready unless a configured store is unreachable
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = store_check(&state).await;
    let is_ready = store.status != HealthStatus::Unhealthy;

    let response = ReadyResponse {
        status: if is_ready {
            HealthStatus::Ready
        } else {
            HealthStatus::NotReady
        },
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        reason: store.error.filter(|_| !is_ready),
    };
    let code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
