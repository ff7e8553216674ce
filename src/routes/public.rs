/**
 * Public Routes
 * Server-rendered marketing pages and the contact form
 */
use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;

use crate::contact::{ContactForm, ContactInput};
use crate::db::models::Category;
use crate::site::{pages, SiteData};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    /// `all` or a category name; anything unknown shows everything
    pub category: Option<String>,
    /// Id of the card whose embed is revealed
    pub play: Option<String>,
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let site = SiteData::load(&state.data).await;
    Html(pages::home(&site))
}

/// GET /portfolio?category=&play=
pub async fn portfolio(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Html<String> {
    let site = SiteData::load(&state.data).await;
    let category = query.category.as_deref().and_then(Category::parse);
    Html(pages::portfolio(&site, category, query.play.as_deref()))
}

/// GET /services
pub async fn services(State(state): State<AppState>) -> Html<String> {
    let site = SiteData::load(&state.data).await;
    Html(pages::services(&site))
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> Html<String> {
    let site = SiteData::load(&state.data).await;
    Html(pages::about(&site))
}

/// GET /contact
pub async fn contact(State(state): State<AppState>) -> Html<String> {
    let site = SiteData::load(&state.data).await;
    Html(pages::contact(
        &site,
        &ContactForm::default(),
        state.data.is_configured(),
    ))
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Form(input): Form<ContactInput>,
) -> Html<String> {
    let mut form = ContactForm::with_values(input);
    form.submit(&state.data).await;
    let site = SiteData::load(&state.data).await;
    Html(pages::contact(&site, &form, state.data.is_configured()))
}
