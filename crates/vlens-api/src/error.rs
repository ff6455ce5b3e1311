//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vlens_gemini::GeminiError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Analysis failed: {0}")]
    Gemini(#[from] GeminiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gemini(e) => match e {
                GeminiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
                GeminiError::PollTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                // Reading the spooled file is a local failure, not a remote one.
                GeminiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Message shown to the user.
    ///
    /// Credential rejections get the specific invalid-key message; every
    /// other remote failure maps to a generic analysis-failure message,
    /// with the underlying detail attached outside production.
    fn detail(&self) -> String {
        let production = std::env::var("ENVIRONMENT")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        match self {
            ApiError::Gemini(GeminiError::InvalidApiKey) => {
                "Invalid API key. Please provide a valid Google API key and try again.".to_string()
            }
            ApiError::Gemini(GeminiError::PollTimeout(_)) => {
                "Timed out waiting for the video to finish processing. Please try again."
                    .to_string()
            }
            ApiError::Gemini(e @ GeminiError::Io(_)) => {
                if production {
                    "An internal error occurred".to_string()
                } else {
                    format!("Internal error: {e}")
                }
            }
            ApiError::Gemini(e) => {
                if production {
                    "An error occurred during analysis. Please try again later.".to_string()
                } else {
                    format!("An error occurred during analysis: {e}")
                }
            }
            ApiError::Internal(_) | ApiError::Io(_) => {
                if production {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
