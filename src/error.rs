use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the proxy. Every request-path failure is converted
/// into one of these variants and rendered as the uniform JSON envelope.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    Validation(String),

    #[error("API key required")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Google authentication required")]
    GoogleAuthRequired,

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("{message}")]
    Upstream { message: String, note: String },

    #[error("{provider} request timed out")]
    UpstreamTimeout { provider: String, note: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MissingApiKey | Self::GoogleAuthRequired => StatusCode::UNAUTHORIZED,
            Self::InvalidApiKey => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Upstream { message, note } => json!({ "error": message, "note": note }),
            Self::UpstreamTimeout { note, .. } => json!({ "error": self.to_string(), "note": note }),
            Self::Internal(detail) => {
                // Detail goes to the log, never to the caller.
                tracing::error!("Internal error: {}", detail);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(ProxyError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::MissingApiKey.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProxyError::InvalidApiKey.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ProxyError::RateLimited.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ProxyError::UpstreamTimeout {
                provider: "DeepSeek".into(),
                note: "n".into()
            }
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn upstream_error_keeps_provider_message() {
        let err = ProxyError::Upstream {
            message: "OpenRouter error: 402".into(),
            note: "Check your OpenRouter API key in environment variables".into(),
        };
        assert_eq!(err.to_string(), "OpenRouter error: 402");
    }
}
