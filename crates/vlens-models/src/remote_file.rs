//! Remote video handle returned by the provider's Files API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque server-side reference to an uploaded video.
///
/// Created on upload in the `PROCESSING` state, transitions to `ACTIVE`
/// (or `FAILED`) via polling, consumed once by the orchestrator. Never
/// persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc-123`.
    pub name: String,
    /// URI referenced by `fileData` parts in generation requests.
    pub uri: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: FileState,
}

impl RemoteFile {
    /// Whether the file is still being processed server-side.
    pub fn is_processing(&self) -> bool {
        self.state == FileState::Processing
    }

    /// Whether the file can be referenced in a generation request.
    pub fn is_ready(&self) -> bool {
        self.state == FileState::Active
    }
}

/// Processing state reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// Uploaded, not yet usable.
    #[default]
    Processing,
    /// Ready for use in generation requests.
    Active,
    /// Terminal failure; the file will never become usable.
    Failed,
    /// Any state this client does not know about.
    #[serde(other)]
    Unspecified,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unspecified => "STATE_UNSPECIFIED",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_processing_file() {
        let json = r#"{
            "name": "files/abc-123",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc-123",
            "mimeType": "video/mp4",
            "state": "PROCESSING"
        }"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name, "files/abc-123");
        assert!(file.is_processing());
        assert!(!file.is_ready());
    }

    #[test]
    fn test_deserialize_active_file() {
        let json = r#"{"name": "files/x", "uri": "https://example.com/files/x", "state": "ACTIVE"}"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert!(file.is_ready());
    }

    #[test]
    fn test_unknown_state_maps_to_unspecified() {
        let json = r#"{"name": "files/x", "uri": "u", "state": "SOMETHING_NEW"}"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.state, FileState::Unspecified);
        assert!(!file.is_ready());
    }

    #[test]
    fn test_missing_state_defaults_to_processing() {
        let json = r#"{"name": "files/x", "uri": "u"}"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.state, FileState::Processing);
    }
}
