//! IMA Site - library for app logic and testing

pub mod admin;
pub mod auth;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod site;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::auth::{AuthService, GoTrueProvider, LocalProvider, SessionRegistry};
use crate::config::{BackendConfig, Config};
use crate::db::{DataAccess, MemoryBackend, RestBackend, RestConfig};
use crate::error::AppError;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub data: DataAccess,
    pub auth: AuthService,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid HOST/PORT configuration: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("Failed to set up backend: {0}")]
    Backend(#[from] AppError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppState {
    /// Wire the handles together. Admin sessions follow the auth service's
    /// sign-out notifications from here on.
    pub fn new(data: DataAccess, auth: AuthService, config: Config) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session_ttl));
        if auth.is_configured() {
            sessions.clone().listen(auth.subscribe());
        }
        Self {
            data,
            auth,
            sessions,
            config: Arc::new(config),
        }
    }

    /// Build the store and auth handles the configuration asks for.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let (data, auth, seed) = match &config.backend {
            BackendConfig::Remote { url, anon_key } => {
                let store = RestBackend::new(RestConfig {
                    url: url.clone(),
                    anon_key: anon_key.clone(),
                })?;
                let provider = GoTrueProvider::new(url, anon_key)?;
                tracing::info!(url = %url, "using hosted content store");
                (
                    DataAccess::configured(store),
                    AuthService::configured(provider),
                    config.seed_fixtures,
                )
            }
            BackendConfig::Local {
                admin_email,
                admin_password_hash,
            } => {
                let provider = LocalProvider::new(admin_email, admin_password_hash.clone())?;
                tracing::info!(admin = %admin_email, "using in-process content store");
                (
                    DataAccess::configured(MemoryBackend::new()),
                    AuthService::configured(provider),
                    true,
                )
            }
            BackendConfig::Disabled => {
                tracing::warn!(
                    "SUPABASE_URL / SUPABASE_ANON_KEY not set. Public pages render defaults \
                     and every write is refused."
                );
                (DataAccess::Unconfigured, AuthService::Unconfigured, false)
            }
        };

        if seed {
            match db::fixtures::seed(&data).await {
                Ok(true) => tracing::info!("demo fixtures seeded"),
                Ok(false) => tracing::debug!("store already has content, skipping fixtures"),
                Err(e) => tracing::warn!(error = %e, "failed to seed demo fixtures"),
            }
        }

        Ok(Self::new(data, auth, config))
    }
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/", get(routes::public::home))
        .route("/portfolio", get(routes::public::portfolio))
        .route("/services", get(routes::public::services))
        .route("/about", get(routes::public::about))
        .route(
            "/contact",
            get(routes::public::contact).post(routes::public::submit_contact),
        )
        .route(
            "/admin/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/admin/logout", post(routes::auth::logout))
        .merge(routes::admin::router())
        .route("/api/content", get(routes::api::content))
        .route("/api/navigation", get(routes::api::navigation))
        .route("/api/social-links", get(routes::api::social_links))
        .route("/api/portfolio", get(routes::api::portfolio))
        .route("/api/settings", get(routes::api::settings))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/ready", get(routes::health::health_ready))
        .fallback(routes::fallback)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Held until shutdown; dropping them stops the log writer threads
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    if config.is_production() {
        if let BackendConfig::Local { .. } = config.backend {
            tracing::warn!(
                "SECURITY: LOCAL_BACKEND is enabled in production. Content lives in process \
                 memory and is lost on restart."
            );
        }
    }

    let addr = config.bind_addr()?;
    let state = AppState::from_config(config).await?;
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
