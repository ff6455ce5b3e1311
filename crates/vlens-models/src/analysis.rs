//! Analysis request/response shapes.

use serde::{Deserialize, Serialize};

/// Successful analysis response body.
///
/// The answer is free-form markdown produced by the agent; it is rendered
/// once by the page and not persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub answer: String,
}
