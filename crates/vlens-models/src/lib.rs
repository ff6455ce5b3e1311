//! Shared data types for the vidlens video Q&A service.
//!
//! These types cross crate boundaries: the upload format gate, the remote
//! file handle returned by the provider, and the analysis response shape.

pub mod analysis;
pub mod remote_file;
pub mod video_format;

pub use analysis::AnalyzeResponse;
pub use remote_file::{FileState, RemoteFile};
pub use video_format::VideoFormat;
