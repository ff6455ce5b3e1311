//! Services.

pub mod analyzer;

pub use analyzer::{build_analysis_prompt, Analyzer};
