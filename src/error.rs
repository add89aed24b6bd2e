use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ForgeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("model response error: {0}")]
    ModelResponse(String),
}

impl ForgeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for ForgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            ForgeError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION".to_string(),
                    message,
                },
            ),
            ForgeError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found"),
                },
            ),
            ForgeError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiErrorBody {
                    code: "RATE_LIMIT".to_string(),
                    message: "Too many requests. Try again later.".to_string(),
                },
            ),
            ForgeError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
            ForgeError::ModelResponse(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "MODEL_RESPONSE".to_string(),
                    message,
                },
            ),
            ForgeError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Failed to parse AI response. Please try again.".to_string(),
                },
            ),
            ForgeError::Reqwest(_) | ForgeError::UrlParse(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                },
            ),
            // 429 and auth failures pass through; everything else is a 502
            ForgeError::UpstreamStatus(code) => {
                let (status, err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMIT",
                        "Upstream rate limit exceeded.",
                    ),
                    StatusCode::UNAUTHORIZED => (
                        StatusCode::UNAUTHORIZED,
                        "UNAUTHORIZED",
                        "Upstream authentication failed.",
                    ),
                    StatusCode::FORBIDDEN => (
                        StatusCode::FORBIDDEN,
                        "FORBIDDEN",
                        "Upstream permission denied.",
                    ),
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "BAD_GATEWAY",
                        "Upstream service is unavailable.",
                    ),
                };
                (
                    status,
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
