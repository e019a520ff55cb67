pub mod articles;
pub mod health;

use axum::{routing::any, routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Article routes answer every method the same way
        .route("/", any(articles::get_default_article))
        .route("/articles/", any(articles::get_article_without_id))
        .route("/articles/:article_id", any(articles::get_article))
        .fallback(articles::unknown_route)
}
