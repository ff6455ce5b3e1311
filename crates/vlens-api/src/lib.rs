//! Axum HTTP server for the vidlens video Q&A tool.
//!
//! This crate provides:
//! - the embedded single-page UI
//! - the multipart analysis endpoint (intake → remote orchestration →
//!   presentation, strictly linear per request)
//! - health/readiness probes, CORS, security headers, request logging

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod ui;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::Analyzer;
pub use state::AppState;
