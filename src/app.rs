use axum::{
    http::{header, HeaderName, HeaderValue},
    Router,
};
use std::sync::Arc;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::middleware::{request_id_layer, request_span};
use crate::routes;
use crate::services::{ArticleCache, KeyedLocks, Simplifier, Translator};

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub cache: Arc<dyn ArticleCache>,
    pub translator: Arc<dyn Translator>,
    pub simplifier: Arc<dyn Simplifier>,
    /// Serializes cache-miss work per article id
    pub in_flight: KeyedLocks,
}

impl AppState {
    pub fn new(
        settings: Settings,
        cache: Arc<dyn ArticleCache>,
        translator: Arc<dyn Translator>,
        simplifier: Arc<dyn Simplifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            settings,
            cache,
            translator,
            simplifier,
            in_flight: KeyedLocks::new(),
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // The request span carries the request id; per-request events stay at DEBUG
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    let mut router = Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id);

    for (name, value) in response_headers() {
        router = router.layer(SetResponseHeaderLayer::overriding(name, value));
    }

    router.with_state(state)
}

/// Headers attached to every response, including errors.
fn response_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ),
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ),
    ]
}
