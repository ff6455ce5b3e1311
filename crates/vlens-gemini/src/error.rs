//! Gemini client error types.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// The provider rejected the API key.
    #[error("invalid API key")]
    InvalidApiKey,

    /// Non-success response from the provider that is not a credential
    /// rejection.
    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upload handshake did not return an upload URL.
    #[error("upload handshake missing X-Goog-Upload-URL header")]
    MissingUploadUrl,

    /// The provider reported a terminal failure while processing the file.
    #[error("video processing failed for {name} (state {state})")]
    FileFailed { name: String, state: String },

    /// The file never left the processing state within the deadline.
    #[error("timed out after {0:?} waiting for video processing")]
    PollTimeout(Duration),

    /// A success response carried no usable content.
    #[error("no content in Gemini response")]
    EmptyResponse,

    /// Local I/O failure while reading the media to upload.
    #[error("failed to read media file: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    /// Whether this failure is a credential rejection.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, GeminiError::InvalidApiKey)
    }
}

/// Structured error body returned by the provider.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Classify a non-success provider response into a typed error.
///
/// The error body's `details[].reason` field carries machine-readable
/// reasons (`API_KEY_INVALID` for a rejected key); those are inspected by
/// kind rather than by scanning the human-readable message.
pub(crate) fn classify_error(status: u16, body: &str) -> GeminiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let invalid_key = parsed
                .error
                .details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"));
            if invalid_key {
                GeminiError::InvalidApiKey
            } else {
                GeminiError::Api {
                    status,
                    message: parsed.error.message,
                }
            }
        }
        Err(_) => GeminiError::Api {
            status,
            message: body.trim().to_string(),
        },
    }
}
