//! Application state.

use std::sync::Arc;

use vlens_gemini::GeminiClient;

use crate::config::ApiConfig;
use crate::services::Analyzer;

/// Shared application state.
///
/// The Gemini client is constructed once at startup and shared by `Arc`
/// into every request handler; nothing here is mutable across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Analyzer,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Self {
        let gemini = Arc::new(GeminiClient::with_base_url(config.gemini_base_url.as_str()));
        let analyzer = Analyzer::new(gemini, config.model.clone(), config.poll.clone());

        Self { config, analyzer }
    }
}
