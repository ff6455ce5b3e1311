//! Remote analysis orchestration.
//!
//! One linear pipeline per request: upload the spooled video, wait for
//! the provider to finish processing it, then run a search-grounded
//! generation request embedding the user's question.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use vlens_gemini::{GeminiClient, GeminiResult, PollConfig};
use vlens_models::VideoFormat;

/// Orchestrates upload, processing wait, and generation.
#[derive(Clone)]
pub struct Analyzer {
    gemini: Arc<GeminiClient>,
    model: String,
    poll: PollConfig,
}

impl Analyzer {
    pub fn new(gemini: Arc<GeminiClient>, model: String, poll: PollConfig) -> Self {
        Self { gemini, model, poll }
    }

    /// Run the full pipeline for one spooled video and one question.
    ///
    /// Returns the agent's markdown answer. The caller owns the temp file
    /// and removes it whatever this returns.
    pub async fn analyze(
        &self,
        api_key: &str,
        video_path: &Path,
        format: VideoFormat,
        query: &str,
    ) -> GeminiResult<String> {
        let uploaded = self
            .gemini
            .upload_file(api_key, video_path, format.mime_type())
            .await?;

        let ready = self
            .gemini
            .wait_until_ready(api_key, uploaded, &self.poll)
            .await?;

        let prompt = build_analysis_prompt(query);
        let answer = self
            .gemini
            .generate(api_key, &self.model, &prompt, &ready)
            .await?;

        info!(video = %ready.name, answer_len = answer.len(), "Analysis complete");
        Ok(answer)
    }
}

/// Build the analysis prompt embedding the literal user query.
pub fn build_analysis_prompt(query: &str) -> String {
    format!(
        r#"Analyze the uploaded video for content and context.
Respond to the following query using video insights and supplementary web research:
{query}

Provide a detailed, user-friendly, and actionable response."#
    )
}
