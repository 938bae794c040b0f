//! Configuration loading from uplift.toml
//!
//! Defaults for both analyses can be kept in an `uplift.toml` file. The file is
//! discovered by walking up from the current directory; command-line flags
//! override anything it sets.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uplift_report::{BayesianReportOptions, OutputFormat, ReportStyle};
use uplift_stats::{AnalysisError, BayesianConfig, DEFAULT_ALPHA, DEFAULT_POSTERIOR_SAMPLES};

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "uplift.toml";

/// Uplift configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpliftConfig {
    /// Posterior sampling settings
    #[serde(default)]
    pub bayesian: BayesianSection,
    /// Z-test settings
    #[serde(default)]
    pub frequentist: FrequentistSection,
    /// Output settings
    #[serde(default)]
    pub output: OutputSection,
}

/// `[bayesian]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianSection {
    /// Posterior draws per variant
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Fixed seed for reproducible draws (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Sample both variants concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Credible level of the uplift interval
    #[serde(default = "default_credible_level")]
    pub credible_level: f64,
    /// Width of the uplift histogram bins
    #[serde(default = "default_bin_width")]
    pub histogram_bin_width: f64,
}

impl Default for BayesianSection {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: None,
            parallel: default_parallel(),
            credible_level: default_credible_level(),
            histogram_bin_width: default_bin_width(),
        }
    }
}

fn default_samples() -> usize {
    DEFAULT_POSTERIOR_SAMPLES
}
fn default_parallel() -> bool {
    true
}
fn default_credible_level() -> f64 {
    0.95
}
fn default_bin_width() -> f64 {
    0.01
}

impl BayesianSection {
    /// Sampling configuration for the analyzer
    pub fn sampling(&self) -> BayesianConfig {
        BayesianConfig {
            samples: self.samples,
            parallel: self.parallel,
        }
    }

    /// Options for the report's uplift summary
    pub fn report_options(&self) -> BayesianReportOptions {
        BayesianReportOptions {
            credible_level: self.credible_level,
            histogram_bin_width: self.histogram_bin_width,
        }
    }
}

/// `[frequentist]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentistSection {
    /// Significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// "one" or "two"
    #[serde(default = "default_tails")]
    pub tails: String,
}

impl Default for FrequentistSection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            tails: default_tails(),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
fn default_tails() -> String {
    "two".to_string()
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Default output format: "human", "json", "markdown", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Decimals shown for percentages
    #[serde(default = "default_percent_decimals")]
    pub percent_decimals: usize,
    /// Decimals shown for z-score, p-value and power
    #[serde(default = "default_score_decimals")]
    pub score_decimals: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: default_format(),
            percent_decimals: default_percent_decimals(),
            score_decimals: default_score_decimals(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_percent_decimals() -> usize {
    2
}
fn default_score_decimals() -> usize {
    4
}

impl OutputSection {
    /// Number formatting for renderers
    pub fn style(&self) -> ReportStyle {
        ReportStyle {
            percent_decimals: self.percent_decimals,
            score_decimals: self.score_decimals,
        }
    }
}

impl UpliftConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Find the nearest `uplift.toml` walking up from the current directory
    pub fn discover_path() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Reject values the analyzers would refuse later
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.bayesian.sampling().validate()?;
        if !(self.bayesian.credible_level > 0.0 && self.bayesian.credible_level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "bayesian.credible_level {} must be between 0 and 1",
                self.bayesian.credible_level
            )));
        }
        if !(self.bayesian.histogram_bin_width > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "bayesian.histogram_bin_width {} must be positive",
                self.bayesian.histogram_bin_width
            )));
        }
        if !(self.frequentist.alpha > 0.0 && self.frequentist.alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "frequentist.alpha {} must be strictly between 0 and 1",
                self.frequentist.alpha
            )));
        }
        self.frequentist.tails.parse::<uplift_stats::TailMode>()?;
        self.output
            .format
            .parse::<OutputFormat>()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Uplift Configuration

[bayesian]
# Posterior draws per variant
samples = 50000
# Fixed seed for reproducible results (uncomment to enable)
# seed = 42
# Sample both variants on separate threads
parallel = true
# Credible level of the relative uplift interval (0.0 to 1.0)
credible_level = 0.95
# Bin width of the uplift histogram (0.01 = one percentage point)
histogram_bin_width = 0.01

[frequentist]
# Significance level: 0.10, 0.05 or 0.01 for 90%, 95% or 99% confidence
alpha = 0.05
# "one" or "two"; one-tailed tests pick their tail from the observed data
tails = "two"

[output]
# Default output format: human, json, markdown, csv
format = "human"
# Decimals for percentages
percent_decimals = 2
# Decimals for z-score, p-value and power
score_decimals = 4
"#
        .to_string()
    }
}
