/**
 * Admin Authentication Routes
 * Login / sign-up form and logout, backed by the configured auth provider
 */
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::admin::views::{self, LoginMode};
use crate::auth::session::{clear_cookie, extract_token, session_cookie};
use crate::auth::{Session, SignUpOutcome};
use crate::AppState;

pub const CONFIRMATION_SENT: &str = "Check your email to confirm your account, then sign in.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub mode: LoginMode,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub mode: LoginMode,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn login_page(
    state: &AppState,
    status: StatusCode,
    mode: LoginMode,
    email: &str,
    error: Option<&str>,
    info: Option<&str>,
) -> Response {
    let html = views::login(mode, email, error, info, state.auth.is_configured());
    (status, Html(html)).into_response()
}

/// Register the provider session and hand its token to the browser.
async fn start_session(state: &AppState, session: Session) -> Response {
    let token = state.sessions.create(session).await;
    let cookie = session_cookie(&token, state.sessions.ttl(), state.config.is_production());
    ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /admin/login?mode=signin|signup
pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(token) = extract_token(&headers) {
        if state.sessions.touch(&token).await.is_some() {
            return Redirect::to("/admin").into_response();
        }
    }
    login_page(&state, StatusCode::OK, query.mode, "", None, None)
}

/// POST /admin/login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    match form.mode {
        LoginMode::Signin => match state.auth.sign_in(email, &form.password).await {
            Ok(session) => start_session(&state, session).await,
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "admin sign-in failed");
                let message = e.to_string();
                login_page(&state, StatusCode::UNAUTHORIZED, LoginMode::Signin, email, Some(&message), None)
            }
        },
        LoginMode::Signup => match state.auth.sign_up(email, &form.password).await {
            Ok(SignUpOutcome::SignedIn(session)) => start_session(&state, session).await,
            Ok(SignUpOutcome::PendingConfirmation) => {
                tracing::info!(email = %email, "admin sign-up pending confirmation");
                login_page(&state, StatusCode::OK, LoginMode::Signin, email, None, Some(CONFIRMATION_SENT))
            }
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "admin sign-up failed");
                let message = e.to_string();
                login_page(&state, StatusCode::BAD_REQUEST, LoginMode::Signup, email, Some(&message), None)
            }
        },
    }
}

/// POST /admin/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_token(&headers) {
        if let Some(session) = state.sessions.remove(&token).await {
            // On failure the remote token simply runs out
            if let Err(e) = state.auth.sign_out(&session).await {
                tracing::warn!(error = %e, "provider sign-out failed");
            }
            tracing::info!(user_id = %session.user.id, "admin signed out");
        }
    }
    let cookie = clear_cookie(state.config.is_production());
    ([(header::SET_COOKIE, cookie)], Redirect::to("/admin/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthService, LocalProvider};
    use crate::config::Config;
    use crate::db::DataAccess;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    const EMAIL: &str = "admin@ima.test";
    const PASSWORD: &str = "correct horse";

    fn state(auth: AuthService) -> AppState {
        AppState::new(DataAccess::Unconfigured, auth, Config::default())
    }

    fn local_auth() -> AuthService {
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        AuthService::configured(LocalProvider::with_account(EMAIL, &hash, true))
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/admin/login", get(login_form).post(login))
            .route("/admin/logout", post(logout))
            .with_state(state)
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(res: Response) -> String {
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_sets_cookie_and_redirects() {
        let state = state(local_auth());
        let form = format!("mode=signin&email={}&password=correct+horse", EMAIL);
        let res = test_router(state.clone())
            .oneshot(post_form("/admin/login", &form))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin");
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("ima_session="));
        assert!(cookie.contains("HttpOnly"));
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_wrong_password_shows_provider_message() {
        let form = format!("mode=signin&email={}&password=nope", EMAIL);
        let res = test_router(state(local_auth()))
            .oneshot(post_form("/admin/login", &form))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(res).await.contains("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_sign_up_waits_for_confirmation() {
        let res = test_router(state(local_auth()))
            .oneshot(post_form(
                "/admin/login",
                "mode=signup&email=new%40ima.test&password=secret1",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains(CONFIRMATION_SENT));
    }

    #[tokio::test]
    async fn test_unconfigured_login_page() {
        let req = Request::get("/admin/login").body(Body::empty()).unwrap();
        let res = test_router(state(AuthService::Unconfigured)).oneshot(req).await.unwrap();
        let html = body_text(res).await;
        assert!(html.contains("config-banner"));
        assert!(html.contains("disabled"));
    }

    #[tokio::test]
    async fn test_logout_drops_session() {
        let state = state(local_auth());
        let form = format!("mode=signin&email={}&password=correct+horse", EMAIL);
        let res = test_router(state.clone())
            .oneshot(post_form("/admin/login", &form))
            .await
            .unwrap();
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();

        let req = Request::post("/admin/logout")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let res = test_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.headers()[header::LOCATION], "/admin/login");
        assert!(res.headers()[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
        assert_eq!(state.sessions.len().await, 0);
    }
}
