//! Request ids and the per-request tracing span.
//!
//! Every log line written while serving an article, including the DeepL,
//! OpenAI and Redis calls, is nested under a `request` span that carries the
//! `x-request-id` value, so one id ties a cache miss to its provider calls.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, Request},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Recorded when a request reaches the span without a readable id.
const MISSING_REQUEST_ID: &str = "-";

/// Sets a UUID v4 request id when the caller sent none, and echoes it on the response.
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header_name = HeaderName::from_static(X_REQUEST_ID);

    (
        SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header_name),
    )
}

/// Span for one article request. Runs inside `SetRequestIdLayer`, so the id
/// is normally present.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = request_id(request.headers()),
    )
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(MISSING_REQUEST_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_read_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-7"));

        assert_eq!(request_id(&headers), "req-7");
    }

    #[test]
    fn test_missing_or_unreadable_request_id() {
        assert_eq!(request_id(&HeaderMap::new()), MISSING_REQUEST_ID);

        let mut headers = HeaderMap::new();
        headers.insert(
            X_REQUEST_ID,
            HeaderValue::from_bytes(b"\xffreq").unwrap(),
        );
        assert_eq!(request_id(&headers), MISSING_REQUEST_ID);
    }
}
