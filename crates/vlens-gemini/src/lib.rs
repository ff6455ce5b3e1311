//! Typed client for the Gemini REST API.
//!
//! This crate covers the two provider boundaries the service needs:
//! - the Files API (raw media upload plus processing-state polling), and
//! - `generateContent` with a `fileData` part and a declared
//!   `googleSearch` tool, so the model can ground its answer in web
//!   search results on its own.
//!
//! All provider failures surface as [`GeminiError`] variants. Credential
//! rejections are classified from the structured error body, never by
//! matching substrings of free-form error text.

pub mod client;
pub mod error;

pub use client::{GeminiClient, PollConfig};
pub use error::{GeminiError, GeminiResult};
