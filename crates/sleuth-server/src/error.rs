use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sleuth::errors::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid server address {spec}: {detail}")]
    InvalidAddress { spec: String, detail: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings field name to its environment variable.
pub fn to_env_var(field: &str) -> String {
    format!("SLEUTH_{}", field.replace('.', "__").to_uppercase())
}

/// Client-visible request failures. Backend rate limiting surfaces as
/// 429, everything else unexpected as 500 with a textual detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Internal(String),
}

impl From<BackendError> for ApiError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::RateLimited(detail) => ApiError::RateLimited(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({"detail": self.to_string()}))).into_response()
    }
}
