/**
 * Content API
 * Read-only JSON views of what the public pages render
 */
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::models::{Category, ContentBlock, NavItem, PortfolioItem, SiteSettings, SocialLink};
use crate::error::AppError;
use crate::site;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub featured_only: bool,
}

/// GET /api/content
pub async fn content(State(state): State<AppState>) -> Result<Json<Vec<ContentBlock>>, AppError> {
    Ok(Json(site::load_content(&state.data).await?))
}

/// GET /api/navigation - visible items, falling back to the built-in menu
pub async fn navigation(State(state): State<AppState>) -> Result<Json<Vec<NavItem>>, AppError> {
    let items = site::load_navigation(&state.data).await?;
    if items.is_empty() {
        return Ok(Json(site::default_navigation()));
    }
    Ok(Json(items))
}

/// GET /api/social-links
pub async fn social_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialLink>>, AppError> {
    Ok(Json(site::load_social_links(&state.data).await?))
}

/// GET /api/portfolio?category=&featured_only=
pub async fn portfolio(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let items = site::load_portfolio(&state.data).await?;
    let category = query.category.as_deref().and_then(Category::parse);
    let selected: Vec<PortfolioItem> = if query.featured_only {
        site::featured(&items)
            .into_iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .cloned()
            .collect()
    } else {
        site::in_category(&items, category).into_iter().cloned().collect()
    };
    Ok(Json(selected))
}

/// GET /api/settings
pub async fn settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, AppError> {
    Ok(Json(
        site::load_settings(&state.data).await?.unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use crate::config::Config;
    use crate::db::{fixtures, DataAccess, MemoryBackend};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/api/navigation", get(navigation))
            .route("/api/portfolio", get(portfolio))
            .route("/api/settings", get(settings))
            .with_state(state)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: T = serde_json::from_slice(&body).unwrap();
        (status, value)
    }

    async fn seeded() -> Router {
        let data = DataAccess::configured(MemoryBackend::new());
        fixtures::seed(&data).await.unwrap();
        test_router(AppState::new(data, AuthService::Unconfigured, Config::default()))
    }

    #[tokio::test]
    async fn test_featured_only() {
        let (status, items) =
            get_json::<Vec<PortfolioItem>>(seeded().await, "/api/portfolio?featured_only=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.is_featured && i.is_published));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let (_, items) =
            get_json::<Vec<PortfolioItem>>(seeded().await, "/api/portfolio?category=video").await;
        assert!(items.iter().all(|i| i.category == Category::Video));
        assert!(!items.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_reads_fall_back() {
        let app = test_router(AppState::new(
            DataAccess::Unconfigured,
            AuthService::Unconfigured,
            Config::default(),
        ));
        let (status, nav) = get_json::<Vec<NavItem>>(app.clone(), "/api/navigation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(nav.len(), 5);
        let (_, settings) = get_json::<SiteSettings>(app, "/api/settings").await;
        assert_eq!(settings.primary_color, "#E10600");
    }
}
