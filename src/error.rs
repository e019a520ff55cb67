//! Error types for the external clients and the HTTP boundary.
//!
//! Every failure reaches the caller as a 400 with an `{"error": ...}` body.
//! Only provider-supplied messages are passed through verbatim. Transport
//! and cache details stay in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure talking to a third-party API (DeepL, OpenAI).
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API Error: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl ExternalServiceError {
    pub fn service(&self) -> &'static str {
        match self {
            Self::Transport { service, .. }
            | Self::Provider { service, .. }
            | Self::InvalidResponse { service, .. } => service,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Provider { .. } => self.to_string(),
            Self::Transport { service, .. } => format!("{} service unavailable", service),
            Self::InvalidResponse { service, .. } => {
                format!("{} returned an invalid response", service)
            }
        }
    }
}

/// Failure talking to the article cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to connect to Redis after {attempts} attempts: {source}")]
    Connect {
        attempts: u32,
        #[source]
        source: redis::RedisError,
    },

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::ExternalService(e) => e.public_message(),
            Self::Cache(_) => "Cache unavailable".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Cache(e) => {
                tracing::error!(error = %e, "Cache error");
            }
            Self::ExternalService(e) => {
                tracing::error!(service = e.service(), error = %e, "External service error");
            }
            Self::BadRequest(_) => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_public() {
        let err = ApiError::from(ExternalServiceError::Provider {
            service: "DeepL",
            message: "Quota exceeded".to_string(),
        });
        assert_eq!(err.public_message(), "DeepL API Error: Quota exceeded");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cache_details_are_not_public() {
        let source = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
        let err = ApiError::from(CacheError::Connect {
            attempts: 3,
            source,
        });
        assert_eq!(err.public_message(), "Cache unavailable");
    }

    #[test]
    fn test_invalid_response_is_sanitized() {
        let err = ApiError::from(ExternalServiceError::InvalidResponse {
            service: "OpenAI",
            message: "expected value at line 1 column 1".to_string(),
        });
        assert_eq!(err.public_message(), "OpenAI returned an invalid response");
    }
}
