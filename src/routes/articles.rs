//! Article endpoints.
//!
//! Serve an English article translated into Japanese and rewritten at N5
//! level. Results are cached in Redis by article id and served from there on
//! every later request.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::Uri,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::AppState;
use crate::config::SimplifyFailurePolicy;
use crate::domain::articles::{self, Article, DEFAULT_ARTICLE_ID};
use crate::domain::translation::TARGET_LANG_JA;
use crate::error::{ApiError, ApiResult, ExternalServiceError};
use crate::services::translator;

/// Serve the built-in article.
///
/// ANY /
pub async fn get_default_article(State(state): State<Arc<AppState>>) -> ApiResult<Json<String>> {
    serve_article(&state, DEFAULT_ARTICLE_ID).await
}

/// Serve a catalog article by id.
///
/// ANY /articles/:article_id
pub async fn get_article(
    article_id: Result<Path<String>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<String>> {
    let Path(article_id) = article_id.map_err(|rejection| {
        ApiError::BadRequest(format!("Invalid article id: {}", rejection.body_text()))
    })?;
    articles::validate_article_id(&article_id).map_err(ApiError::BadRequest)?;
    serve_article(&state, &article_id).await
}

/// ANY /articles/
pub async fn get_article_without_id() -> ApiError {
    ApiError::BadRequest("Article id must not be empty".to_string())
}

/// Anything outside the route table still answers with the JSON error shape.
pub async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::BadRequest(format!("Unknown route: {}", uri.path()))
}

#[instrument(skip(state))]
async fn serve_article(state: &AppState, article_id: &str) -> ApiResult<Json<String>> {
    let article = articles::find(article_id)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown article: {}", article_id)))?;

    if article.body.len() > articles::MAX_ARTICLE_BODY_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Article {} is too long to translate",
            article_id
        )));
    }

    let simplified = simplified_article(state, article).await?;
    Ok(Json(simplified))
}

/// Cached text for an article. An empty value is left over from a degraded
/// simplification and counts as a miss.
async fn cached_article(state: &AppState, article_id: &str) -> ApiResult<Option<String>> {
    let cached = state.cache.get(article_id).await?;
    Ok(cached.filter(|text| !text.is_empty()))
}

/// Cache lookup, falling back to translate, simplify and store.
async fn simplified_article(state: &AppState, article: &Article) -> ApiResult<String> {
    if let Some(cached) = cached_article(state, article.id).await? {
        debug!(article_id = article.id, "Returning cached article");
        return Ok(cached);
    }

    let _guard = state.in_flight.lock(article.id).await;

    // Filled by a concurrent request while we waited on the lock
    if let Some(cached) = cached_article(state, article.id).await? {
        debug!(article_id = article.id, "Article cached by concurrent request");
        return Ok(cached);
    }

    let translation = state
        .translator
        .translate(article.body, TARGET_LANG_JA)
        .await?;
    let translated = translation
        .first_text()
        .ok_or_else(|| ExternalServiceError::InvalidResponse {
            service: translator::SERVICE,
            message: "no translations returned".to_string(),
        })?;

    let simplified = match state.simplifier.simplify(translated).await {
        Ok(text) => text,
        Err(e) => match state.settings.simplify_failure_policy {
            SimplifyFailurePolicy::Propagate => return Err(e.into()),
            SimplifyFailurePolicy::Degrade => {
                warn!(article_id = article.id, error = %e, "Simplification failed, serving empty text");
                String::new()
            }
        },
    };

    state.cache.set(article.id, &simplified).await?;

    info!(
        article_id = article.id,
        chars = simplified.chars().count(),
        "Article simplified and cached"
    );

    Ok(simplified)
}
