/**
 * Routes Module
 * Public pages, admin console, JSON content API and health checks
 */

pub mod admin;
pub mod api;
pub mod auth;
pub mod health;
pub mod public;

use axum::response::Redirect;

/// Unmatched paths go back to the home page.
pub async fn fallback() -> Redirect {
    Redirect::to("/")
}
