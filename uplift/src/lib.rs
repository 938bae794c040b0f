#![warn(missing_docs)]
//! # Uplift
//!
//! A/B test calculator for conversion experiments, answering "is B better
//! than A?" two ways:
//! - **Bayesian**: Beta(1, 1) priors updated with the observed counts, 50,000
//!   Monte Carlo draws per variant, P(B > A) and the relative-uplift
//!   distribution
//! - **Frequentist**: pooled two-proportion z-test with p-value, observed
//!   power, critical values and minimum detectable effect
//! - **Reports**: JSON, Markdown and CSV renderers over one serializable
//!   [`Report`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use uplift::prelude::*;
//!
//! let input = ExperimentInput::new(80_000, 1_600, 80_000, 1_696)?;
//!
//! let bayes = compute_posterior(&input, &BayesianConfig::default())?;
//! println!("P(B > A) = {:.3}", bayes.prob_b_better);
//!
//! let test = run_z_test(&input, &FrequentistConfig::new(0.05, false))?;
//! println!("p = {:.4}, significant: {}", test.p_value, test.is_significant());
//! ```
//!
//! ## Reproducible Sampling
//!
//! ```ignore
//! let result = compute_posterior_seeded(&input, &BayesianConfig::default(), 42)?;
//! let report = build_bayesian_report(&result, &BayesianReportOptions::default())?;
//! println!("{}", generate_json_report(&report)?);
//! ```

// Re-export the statistical engine
pub use uplift_stats::{
    AnalysisError, Arm, ArmCounts, BayesianConfig, BayesianResult, BetaPosterior,
    DEFAULT_ALPHA, DEFAULT_POSTERIOR_SAMPLES, ExperimentInput, FrequentistConfig,
    FrequentistResult, HistogramBin, SignificanceLevel, TailDirection, TailMode,
    UpliftHistogram, UpliftInterval, closed_form_prob_b_better, compute_posterior,
    compute_posterior_seeded, compute_posterior_with_rng, critical_z, observed_power,
    run_z_test, standard_normal_cdf, standard_normal_ppf, z_test,
};

// Re-export reporting
pub use uplift_report::{
    Analysis, BayesianReportOptions, OutputFormat, Report, ReportError, ReportStyle,
    build_bayesian_report, build_frequentist_report, generate_csv_report,
    generate_json_report, generate_markdown_report,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisError, BayesianConfig, BayesianReportOptions, ExperimentInput,
        FrequentistConfig, Report, TailMode, build_bayesian_report, build_frequentist_report,
        compute_posterior, compute_posterior_seeded, generate_json_report, run_z_test,
    };
}

/// Run the Uplift CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     uplift::run()
/// }
/// ```
pub use uplift_cli::run;
