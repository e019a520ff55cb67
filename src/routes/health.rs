use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub cache: String,
}

/// Health check endpoint - public
///
/// The translation and chat-completion providers are metered, so only the
/// cache is probed.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let cache_result = state.cache.health_check().await;

    if let Err(e) = &cache_result {
        tracing::warn!(error = %e, "Cache health check failed");
    }

    let (status, status_code) = if cache_result.is_ok() {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                cache: if cache_result.is_ok() { "ok" } else { "error" }.to_string(),
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    use crate::app::create_app;
    use crate::config::{Settings, SimplifyFailurePolicy};
    use crate::test_support::{FakeSimplifier, FakeTranslator, InMemoryCache};

    async fn health_of(cache: Arc<InMemoryCache>) -> (StatusCode, serde_json::Value) {
        let app = create_app(AppState::new(
            Settings::for_tests(SimplifyFailurePolicy::Propagate),
            cache,
            FakeTranslator::returning(""),
            FakeSimplifier::returning(""),
        ));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_healthy_cache() {
        let (status, body) = health_of(InMemoryCache::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["cache"], "ok");
    }

    #[tokio::test]
    async fn test_unreachable_cache() {
        let (status, body) = health_of(InMemoryCache::unavailable()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["services"]["cache"], "error");
    }
}
