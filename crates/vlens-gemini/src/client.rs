//! Gemini API client.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vlens_models::{FileState, RemoteFile};

use crate::error::{classify_error, GeminiError, GeminiResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client.
///
/// One instance wraps one connection pool and is shared process-wide; the
/// API key is passed per call so a user-supplied key can override the
/// configured one for a single request.
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

/// Polling schedule for the file-processing wait.
///
/// The wait starts at `initial_interval`, doubles up to `max_interval`,
/// and gives up with [`GeminiError::PollTimeout`] once `deadline` has
/// elapsed.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            deadline: Duration::from_secs(300),
        }
    }
}

/// Upload handshake metadata.
#[derive(Debug, Serialize)]
struct UploadStartRequest {
    file: UploadFileMeta,
}

#[derive(Debug, Serialize)]
struct UploadFileMeta {
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Both the finalize step and file lookups wrap the resource.
#[derive(Debug, Deserialize)]
struct FileEnvelope {
    file: RemoteFile,
}

/// Generation request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

/// Generation response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests point this at a
    /// mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Upload a local media file, returning its remote handle.
    ///
    /// Uses the resumable upload protocol in its single-shot form: a
    /// handshake request yields an upload URL, then one request carries
    /// the full payload and finalizes.
    pub async fn upload_file(
        &self,
        api_key: &str,
        path: &Path,
        mime_type: &str,
    ) -> GeminiResult<RemoteFile> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        info!(
            file = %display_name,
            size = bytes.len(),
            mime = mime_type,
            "Uploading video to Gemini Files API"
        );

        let start_url = format!("{}/upload/v1beta/files?key={}", self.base_url, api_key);
        let start = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadFileMeta { display_name },
            })
            .send()
            .await?;

        if !start.status().is_success() {
            let status = start.status().as_u16();
            let body = start.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let upload_url = start
            .headers()
            .get("X-Goog-Upload-URL")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or(GeminiError::MissingUploadUrl)?;

        let finalize = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;

        if !finalize.status().is_success() {
            let status = finalize.status().as_u16();
            let body = finalize.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let envelope: FileEnvelope = finalize.json().await?;
        debug!(name = %envelope.file.name, state = %envelope.file.state, "Upload accepted");
        Ok(envelope.file)
    }

    /// Fetch the current state of a remote file.
    pub async fn get_file(&self, api_key: &str, name: &str) -> GeminiResult<RemoteFile> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, api_key);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        // File lookups return the bare resource, not an envelope.
        Ok(response.json::<RemoteFile>().await?)
    }

    /// Wait until a file leaves the `PROCESSING` state.
    ///
    /// Bounded: backs off from `initial_interval` to `max_interval` and
    /// returns a typed timeout once `deadline` has elapsed. A terminal
    /// `FAILED` (or unknown) state is an error; only `ACTIVE` is returned.
    pub async fn wait_until_ready(
        &self,
        api_key: &str,
        mut file: RemoteFile,
        poll: &PollConfig,
    ) -> GeminiResult<RemoteFile> {
        let started = Instant::now();
        let mut interval = poll.initial_interval;

        while file.is_processing() {
            if started.elapsed() >= poll.deadline {
                warn!(name = %file.name, "Gave up waiting for video processing");
                return Err(GeminiError::PollTimeout(poll.deadline));
            }
            debug!(name = %file.name, interval_ms = interval.as_millis() as u64, "Video still processing");
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(poll.max_interval);
            file = self.get_file(api_key, &file.name).await?;
        }

        match file.state {
            FileState::Active => {
                info!(name = %file.name, elapsed_ms = started.elapsed().as_millis() as u64, "Video ready");
                Ok(file)
            }
            state => Err(GeminiError::FileFailed {
                name: file.name,
                state: state.to_string(),
            }),
        }
    }

    /// Run a search-grounded generation request over a ready video.
    ///
    /// The declared `googleSearch` tool lets the model decide whether and
    /// when to issue web searches; that decision is opaque to the caller.
    /// Returns the concatenated text of the first candidate.
    pub async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        video: &RemoteFile,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        file_data: None,
                    },
                    Part {
                        text: None,
                        file_data: Some(FileData {
                            mime_type: video.mime_type.clone(),
                            file_uri: video.uri.clone(),
                        }),
                    },
                ],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        info!(model = %model, video = %video.name, "Invoking search-grounded generation");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let generated: GenerateResponse = response.json().await?;
        let text: String = generated
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }

        Ok(text)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}
