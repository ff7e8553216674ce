/**
 * Admin Routes
 * Session gate plus the screens of the admin console. Each screen keeps its
 * unsaved state in the admin's session between requests.
 */
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{any, get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::admin::content::ContentForm;
use crate::admin::navigation::{Move, NavForm};
use crate::admin::pages::PageForm;
use crate::admin::portfolio::PortfolioForm;
use crate::admin::settings::SettingsForm;
use crate::admin::social::SocialForm;
use crate::admin::views::{self, Notice};
use crate::admin::{
    ContentEditor, Dashboard, ListEditor, MessageFilter, MessagesScreen, NavigationEditor,
    PagesEditor, PortfolioEditor, Record, Screen, SettingsEditor, SocialEditor,
};
use crate::auth::session::extract_token;
use crate::auth::Session;
use crate::db::models::{ContentBlock, NavItem, PageMeta, PortfolioItem, SocialLink};
use crate::db::{DataAccess, StoreError};
use crate::error::GENERIC_ERROR;
use crate::AppState;

const LOGIN: &str = "/admin/login";

// ============================================================================
// Session gate
// ============================================================================

/// A signed-in admin. Extracting it re-validates the session: an expired
/// provider session gets one refresh attempt, anything else goes to the login page.
pub struct Admin {
    pub token: String,
    pub session: Session,
    /// Store access on behalf of this admin
    pub data: DataAccess,
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Redirect> {
        let token = extract_token(&parts.headers).ok_or_else(|| Redirect::to(LOGIN))?;
        let mut session = state
            .sessions
            .touch(&token)
            .await
            .ok_or_else(|| Redirect::to(LOGIN))?;

        if session.is_expired() {
            match state.auth.refresh(&session).await {
                Ok(fresh) => {
                    state.sessions.replace_session(&token, fresh.clone()).await;
                    session = fresh;
                }
                Err(e) => {
                    tracing::warn!(user_id = %session.user.id, error = %e, "session refresh failed");
                    state.sessions.remove(&token).await;
                    return Err(Redirect::to(LOGIN));
                }
            }
        }

        let data = state.data.for_session(&session.access_token);
        Ok(Self {
            token,
            session,
            data,
        })
    }
}

// ============================================================================
// Screen plumbing
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ScreenQuery {
    /// Any value discards the parked draft
    pub reload: Option<String>,
    pub saved: Option<String>,
    pub error: Option<String>,
    pub filter: Option<MessageFilter>,
}

impl ScreenQuery {
    fn notice(&self) -> Option<Notice> {
        if self.error.is_some() {
            Some(Notice::Error(GENERIC_ERROR.to_string()))
        } else if self.saved.is_some() {
            Some(Notice::Saved)
        } else {
            None
        }
    }
}

trait AdminScreen: Screen + 'static {
    const PATH: &'static str;

    fn render(&self) -> String;

    fn apply_query(&mut self, _query: &ScreenQuery) {}
}

trait ListScreen: AdminScreen {
    type Item: Record;

    fn list_mut(&mut self) -> &mut ListEditor<Self::Item>;
}

macro_rules! list_screen {
    ($ty:ty, $item:ty, $path:literal, $render:path) => {
        impl AdminScreen for $ty {
            const PATH: &'static str = $path;

            fn render(&self) -> String {
                $render(self)
            }
        }

        impl ListScreen for $ty {
            type Item = $item;

            fn list_mut(&mut self) -> &mut ListEditor<$item> {
                &mut self.list
            }
        }
    };
}

list_screen!(NavigationEditor, NavItem, "/admin/navigation", views::navigation);
list_screen!(SocialEditor, SocialLink, "/admin/social-links", views::social);
list_screen!(PortfolioEditor, PortfolioItem, "/admin/portfolio", views::portfolio);
list_screen!(ContentEditor, ContentBlock, "/admin/content", views::content);
list_screen!(PagesEditor, PageMeta, "/admin/pages", views::pages);

impl AdminScreen for MessagesScreen {
    const PATH: &'static str = "/admin/messages";

    fn render(&self) -> String {
        views::messages(self)
    }

    fn apply_query(&mut self, query: &ScreenQuery) {
        if let Some(filter) = query.filter {
            self.filter = filter;
        }
    }
}

impl AdminScreen for SettingsEditor {
    const PATH: &'static str = "/admin/settings";

    fn render(&self) -> String {
        views::settings(self)
    }
}

/// The parked draft when it belongs to `S`, otherwise a fresh load. Any
/// other screen's draft is dropped.
async fn open<S: Screen>(state: &AppState, admin: &Admin, fresh: bool) -> Result<S, StoreError> {
    if let Some(draft) = state.sessions.take_draft(&admin.token).await {
        if !fresh {
            if let Ok(screen) = S::try_from(draft) {
                return Ok(screen);
            }
        }
    }
    S::load(&admin.data).await
}

async fn park<S: Screen>(state: &AppState, admin: &Admin, screen: S) {
    state.sessions.put_draft(&admin.token, screen.into()).await;
}

fn page(admin: &Admin, active: &str, notice: Option<Notice>, body: &str) -> Response {
    Html(views::layout(
        active,
        &admin.session.user.email,
        notice.as_ref(),
        body,
    ))
    .into_response()
}

fn failed(path: &str, err: StoreError) -> Response {
    tracing::error!(error = %err, path, "admin action failed");
    Redirect::to(&format!("{}?error=1", path)).into_response()
}

/// Apply a local state transition and return to the screen.
async fn update<S: AdminScreen>(
    state: &AppState,
    admin: &Admin,
    f: impl FnOnce(&mut S) + Send,
) -> Response {
    match open::<S>(state, admin, false).await {
        Ok(mut screen) => {
            f(&mut screen);
            park(state, admin, screen).await;
            Redirect::to(S::PATH).into_response()
        }
        Err(e) => failed(S::PATH, e),
    }
}

/// Saved screens start over from the store; failed ones stay parked.
async fn settle<S: AdminScreen>(
    state: &AppState,
    admin: &Admin,
    screen: S,
    result: Result<(), StoreError>,
) -> Response {
    match result {
        Ok(()) => Redirect::to(&format!("{}?saved=1", S::PATH)).into_response(),
        Err(e) => {
            park(state, admin, screen).await;
            failed(S::PATH, e)
        }
    }
}

// ============================================================================
// Generic handlers
// ============================================================================

async fn show<S: AdminScreen>(
    State(state): State<AppState>,
    admin: Admin,
    Query(query): Query<ScreenQuery>,
) -> Response {
    match open::<S>(&state, &admin, query.reload.is_some()).await {
        Ok(mut screen) => {
            screen.apply_query(&query);
            let body = screen.render();
            park(&state, &admin, screen).await;
            page(&admin, S::PATH, query.notice(), &body)
        }
        Err(e) => {
            tracing::error!(error = %e, path = S::PATH, "failed to load admin screen");
            page(&admin, S::PATH, Some(Notice::Error(GENERIC_ERROR.to_string())), "")
        }
    }
}

async fn save<S: ListScreen>(State(state): State<AppState>, admin: Admin) -> Response {
    let mut screen = match open::<S>(&state, &admin, false).await {
        Ok(screen) => screen,
        Err(e) => return failed(S::PATH, e),
    };
    let result = screen.list_mut().save(&admin.data).await;
    settle(&state, &admin, screen, result).await
}

async fn request_delete<S: ListScreen>(
    State(state): State<AppState>,
    admin: Admin,
    Path(key): Path<String>,
) -> Response {
    update::<S>(&state, &admin, |s| {
        s.list_mut().request_delete(&key);
    })
    .await
}

async fn confirm_delete<S: ListScreen>(State(state): State<AppState>, admin: Admin) -> Response {
    update::<S>(&state, &admin, |s| {
        if let Some(item) = s.list_mut().confirm_delete() {
            tracing::debug!(key = item.key(), "removed from draft");
        }
    })
    .await
}

async fn cancel_delete<S: ListScreen>(State(state): State<AppState>, admin: Admin) -> Response {
    update::<S>(&state, &admin, |s| s.list_mut().cancel_delete()).await
}

// ============================================================================
// Screen-specific handlers
// ============================================================================

async fn dashboard(State(state): State<AppState>, admin: Admin) -> Response {
    state.sessions.clear_draft(&admin.token).await;
    match Dashboard::load(&admin.data).await {
        Ok(d) => page(&admin, "/admin", None, &views::dashboard(&d)),
        Err(e) => {
            tracing::error!(error = %e, "failed to load dashboard");
            page(&admin, "/admin", Some(Notice::Error(GENERIC_ERROR.to_string())), "")
        }
    }
}

async fn nav_create(State(state): State<AppState>, admin: Admin, Form(form): Form<NavForm>) -> Response {
    update::<NavigationEditor>(&state, &admin, |s| {
        s.create(&form);
    })
    .await
}

async fn nav_edit(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Form(form): Form<NavForm>,
) -> Response {
    update::<NavigationEditor>(&state, &admin, |s| {
        s.edit(&id, &form);
    })
    .await
}

async fn nav_toggle(State(state): State<AppState>, admin: Admin, Path(id): Path<String>) -> Response {
    update::<NavigationEditor>(&state, &admin, |s| {
        s.toggle_visibility(&id);
    })
    .await
}

async fn nav_move_up(State(state): State<AppState>, admin: Admin, Path(id): Path<String>) -> Response {
    update::<NavigationEditor>(&state, &admin, |s| {
        s.move_item(&id, Move::Up);
    })
    .await
}

async fn nav_move_down(State(state): State<AppState>, admin: Admin, Path(id): Path<String>) -> Response {
    update::<NavigationEditor>(&state, &admin, |s| {
        s.move_item(&id, Move::Down);
    })
    .await
}

async fn social_create(
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<SocialForm>,
) -> Response {
    update::<SocialEditor>(&state, &admin, |s| {
        s.create(&form);
    })
    .await
}

async fn social_edit(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Form(form): Form<SocialForm>,
) -> Response {
    update::<SocialEditor>(&state, &admin, |s| {
        s.edit(&id, &form);
    })
    .await
}

async fn social_toggle(State(state): State<AppState>, admin: Admin, Path(id): Path<String>) -> Response {
    update::<SocialEditor>(&state, &admin, |s| {
        s.toggle_visibility(&id);
    })
    .await
}

async fn portfolio_create(
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<PortfolioForm>,
) -> Response {
    update::<PortfolioEditor>(&state, &admin, |s| {
        s.create(&form);
    })
    .await
}

async fn portfolio_edit(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Form(form): Form<PortfolioForm>,
) -> Response {
    update::<PortfolioEditor>(&state, &admin, |s| {
        s.edit(&id, &form);
    })
    .await
}

async fn content_create(
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<ContentForm>,
) -> Response {
    update::<ContentEditor>(&state, &admin, |s| {
        s.create(&form);
    })
    .await
}

async fn content_edit(
    State(state): State<AppState>,
    admin: Admin,
    Path(key): Path<String>,
    Form(form): Form<ContentForm>,
) -> Response {
    update::<ContentEditor>(&state, &admin, |s| {
        s.edit(&key, &form);
    })
    .await
}

async fn pages_edit(
    State(state): State<AppState>,
    admin: Admin,
    Path(slug): Path<String>,
    Form(form): Form<PageForm>,
) -> Response {
    update::<PagesEditor>(&state, &admin, |s| {
        s.edit(&slug, &form);
    })
    .await
}

async fn message_select(State(state): State<AppState>, admin: Admin, Path(id): Path<String>) -> Response {
    let mut screen = match open::<MessagesScreen>(&state, &admin, false).await {
        Ok(screen) => screen,
        Err(e) => return failed(MessagesScreen::PATH, e),
    };
    let result = screen.select(&admin.data, &id).await;
    park(&state, &admin, screen).await;
    match result {
        Ok(_) => Redirect::to(MessagesScreen::PATH).into_response(),
        Err(e) => failed(MessagesScreen::PATH, e),
    }
}

async fn message_close(State(state): State<AppState>, admin: Admin) -> Response {
    update::<MessagesScreen>(&state, &admin, |s| s.close()).await
}

async fn message_request_delete(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
) -> Response {
    update::<MessagesScreen>(&state, &admin, |s| {
        s.request_delete(&id);
    })
    .await
}

async fn message_cancel_delete(State(state): State<AppState>, admin: Admin) -> Response {
    update::<MessagesScreen>(&state, &admin, |s| s.cancel_delete()).await
}

async fn message_confirm_delete(State(state): State<AppState>, admin: Admin) -> Response {
    let mut screen = match open::<MessagesScreen>(&state, &admin, false).await {
        Ok(screen) => screen,
        Err(e) => return failed(MessagesScreen::PATH, e),
    };
    let result = screen.confirm_delete(&admin.data).await;
    park(&state, &admin, screen).await;
    match result {
        Ok(_) => Redirect::to(MessagesScreen::PATH).into_response(),
        Err(e) => failed(MessagesScreen::PATH, e),
    }
}

async fn settings_save(
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<SettingsForm>,
) -> Response {
    let mut screen = match open::<SettingsEditor>(&state, &admin, false).await {
        Ok(screen) => screen,
        Err(e) => return failed(SettingsEditor::PATH, e),
    };
    screen.apply(&form);
    let result = screen.save(&admin.data).await;
    settle(&state, &admin, screen, result).await
}

/// Unknown admin paths: signed-in admins land on the dashboard, everyone
/// else is turned away by the gate.
async fn unknown(_admin: Admin) -> Redirect {
    Redirect::to("/admin")
}

/// Every admin route except login and logout.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        // Navigation
        .route("/admin/navigation", get(show::<NavigationEditor>))
        .route("/admin/navigation/new", post(nav_create))
        .route("/admin/navigation/save", post(save::<NavigationEditor>))
        .route("/admin/navigation/delete/confirm", post(confirm_delete::<NavigationEditor>))
        .route("/admin/navigation/delete/cancel", post(cancel_delete::<NavigationEditor>))
        .route("/admin/navigation/{id}/edit", post(nav_edit))
        .route("/admin/navigation/{id}/toggle", post(nav_toggle))
        .route("/admin/navigation/{id}/move-up", post(nav_move_up))
        .route("/admin/navigation/{id}/move-down", post(nav_move_down))
        .route("/admin/navigation/{id}/delete", post(request_delete::<NavigationEditor>))
        // Social links
        .route("/admin/social-links", get(show::<SocialEditor>))
        .route("/admin/social-links/new", post(social_create))
        .route("/admin/social-links/save", post(save::<SocialEditor>))
        .route("/admin/social-links/delete/confirm", post(confirm_delete::<SocialEditor>))
        .route("/admin/social-links/delete/cancel", post(cancel_delete::<SocialEditor>))
        .route("/admin/social-links/{id}/edit", post(social_edit))
        .route("/admin/social-links/{id}/toggle", post(social_toggle))
        .route("/admin/social-links/{id}/delete", post(request_delete::<SocialEditor>))
        // Portfolio
        .route("/admin/portfolio", get(show::<PortfolioEditor>))
        .route("/admin/portfolio/new", post(portfolio_create))
        .route("/admin/portfolio/save", post(save::<PortfolioEditor>))
        .route("/admin/portfolio/delete/confirm", post(confirm_delete::<PortfolioEditor>))
        .route("/admin/portfolio/delete/cancel", post(cancel_delete::<PortfolioEditor>))
        .route("/admin/portfolio/{id}/edit", post(portfolio_edit))
        .route("/admin/portfolio/{id}/delete", post(request_delete::<PortfolioEditor>))
        // Content
        .route("/admin/content", get(show::<ContentEditor>))
        .route("/admin/content/new", post(content_create))
        .route("/admin/content/save", post(save::<ContentEditor>))
        .route("/admin/content/delete/confirm", post(confirm_delete::<ContentEditor>))
        .route("/admin/content/delete/cancel", post(cancel_delete::<ContentEditor>))
        .route("/admin/content/{key}/edit", post(content_edit))
        .route("/admin/content/{key}/delete", post(request_delete::<ContentEditor>))
        // Pages
        .route("/admin/pages", get(show::<PagesEditor>))
        .route("/admin/pages/save", post(save::<PagesEditor>))
        .route("/admin/pages/{slug}/edit", post(pages_edit))
        // Messages
        .route("/admin/messages", get(show::<MessagesScreen>))
        .route("/admin/messages/close", post(message_close))
        .route("/admin/messages/delete/confirm", post(message_confirm_delete))
        .route("/admin/messages/delete/cancel", post(message_cancel_delete))
        .route("/admin/messages/{id}/select", post(message_select))
        .route("/admin/messages/{id}/delete", post(message_request_delete))
        // Settings
        .route("/admin/settings", get(show::<SettingsEditor>))
        .route("/admin/settings/save", post(settings_save))
        .route("/admin/{*rest}", any(unknown))
}
