#![warn(missing_docs)]
//! Uplift Report - Reporting for experiment analyses
//!
//! Turns analyzer results into a serializable [`Report`] and renders it as:
//! - JSON (machine-readable)
//! - Markdown (summary tables)
//! - CSV (spreadsheet-compatible)
//!
//! Human-readable terminal output lives in the CLI.

mod csv;
mod json;
mod markdown;
mod report;
mod style;

pub use csv::generate_csv_report;
pub use json::generate_json_report;
pub use markdown::generate_markdown_report;
pub use report::{
    Analysis, BayesianReportOptions, BayesianSummary, Bin, FrequentistSummary, Histogram,
    PosteriorParams, Report, ReportMeta, SCHEMA_VERSION, VariantRow, build_bayesian_report,
    build_frequentist_report,
};
pub use style::{ReportStyle, group_thousands};

use thiserror::Error;
use uplift_stats::AnalysisError;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Human,
    /// JSON with full schema
    Json,
    /// Markdown summary tables
    Markdown,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" | "github" | "github-summary" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors from building or rendering reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Format name not recognised
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// Underlying analysis rejected the request
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("github".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!(matches!(
            "html".parse::<OutputFormat>(),
            Err(ReportError::UnknownFormat(f)) if f == "html"
        ));
    }
}
