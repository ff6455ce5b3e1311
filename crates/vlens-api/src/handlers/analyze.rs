//! Video analysis endpoint.

use std::io::Write;
use std::path::PathBuf;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use vlens_models::{AnalyzeResponse, VideoFormat};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart fields accepted by the analyze endpoint.
struct AnalyzeForm {
    filename: String,
    video: Bytes,
    query: String,
    api_key: Option<String>,
}

/// Run one analysis: intake → upload/poll/generate → answer.
///
/// All local validation happens before any remote call. The spooled video
/// is removed exactly once whether the analysis succeeds or fails.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    let format = VideoFormat::from_filename(&form.filename).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unsupported video format '{}'. Supported formats: mp4, mov, avi.",
            form.filename
        ))
    })?;

    if form.video.is_empty() {
        return Err(ApiError::bad_request("The uploaded video file is empty."));
    }

    let query = form.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::validation(
            "Please enter a question or insight to analyze the video.",
        ));
    }

    let api_key = form
        .api_key
        .or_else(|| state.config.api_key.clone())
        .ok_or_else(|| {
            ApiError::unauthorized("Please provide a Google API key to enable AI functionalities.")
        })?;

    info!(
        filename = %form.filename,
        format = %format,
        size = form.video.len(),
        "Starting video analysis"
    );

    let spooled = spool_video(state.config.spool_dir.clone(), format, form.video).await?;

    let result = state
        .analyzer
        .analyze(&api_key, spooled.path(), format, &query)
        .await;

    // Dropping the handle unlinks the file, on the failure path too.
    drop(spooled);

    match result {
        Ok(answer) => Ok(Json(AnalyzeResponse { answer })),
        Err(e) => {
            warn!(error = %e, "Video analysis failed");
            Err(e.into())
        }
    }
}

/// Collect the multipart fields.
async fn read_form(mut multipart: Multipart) -> ApiResult<AnalyzeForm> {
    let mut filename = None;
    let mut video = None;
    let mut query = String::new();
    let mut api_key = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("video") => {
                filename = field.file_name().map(|n| n.to_string());
                video = Some(field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read video upload: {e}"))
                })?);
            }
            Some("query") => {
                query = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read query: {e}")))?;
            }
            Some("api_key") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read api_key: {e}")))?;
                let value = value.trim().to_string();
                if !value.is_empty() {
                    api_key = Some(value);
                }
            }
            _ => {}
        }
    }

    let video = video.ok_or_else(|| ApiError::bad_request("Missing 'video' upload field."))?;
    let filename = filename.unwrap_or_default();

    Ok(AnalyzeForm {
        filename,
        video,
        query,
        api_key,
    })
}

/// Write the uploaded bytes to a uniquely named temp file.
///
/// The file carries the real extension (the provider sniffs by MIME, the
/// preview player by suffix) and lives only as long as the returned
/// handle.
async fn spool_video(
    dir: Option<PathBuf>,
    format: VideoFormat,
    bytes: Bytes,
) -> ApiResult<NamedTempFile> {
    let dir = dir.unwrap_or_else(std::env::temp_dir);
    tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("vidlens-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Spool task panicked: {e}")))?
    .map_err(ApiError::from)
}
