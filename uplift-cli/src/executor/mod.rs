//! Analysis Executor
//!
//! Runs one analysis and renders its report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! AnalysisRequest (flags layered over uplift.toml)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  analysis   │  Validate counts, run the analyzer
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build the serializable Report
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human, JSON, Markdown or CSV
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`analysis`] - Request dispatch and timing
//! - [`formatting`] - Human-readable output formatting

mod analysis;
mod formatting;

pub use analysis::{AnalysisRequest, execute, render};
pub use formatting::format_human_output;
