//! Analysis dispatch

use super::formatting::format_human_output;
use crate::ExperimentArgs;
use std::time::Instant;
use uplift_report::{
    BayesianReportOptions, OutputFormat, Report, ReportStyle, build_bayesian_report,
    build_frequentist_report, generate_csv_report, generate_json_report,
    generate_markdown_report,
};
use uplift_stats::{
    BayesianConfig, ExperimentInput, FrequentistConfig, TailMode, compute_posterior,
    compute_posterior_seeded, run_z_test,
};

/// Fully resolved analysis to run
#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    /// Posterior comparison
    Bayesian {
        /// Observed counts
        counts: ExperimentArgs,
        /// Draw count and parallelism
        sampling: BayesianConfig,
        /// Fixed seed, random when `None`
        seed: Option<u64>,
        /// Interval and histogram settings
        options: BayesianReportOptions,
    },
    /// Two-proportion z-test
    Frequentist {
        /// Observed counts
        counts: ExperimentArgs,
        /// Significance level
        alpha: f64,
        /// One- or two-tailed
        tails: TailMode,
    },
}

impl AnalysisRequest {
    fn counts(&self) -> &ExperimentArgs {
        match self {
            AnalysisRequest::Bayesian { counts, .. } => counts,
            AnalysisRequest::Frequentist { counts, .. } => counts,
        }
    }
}

/// Validate the counts, run the requested analyzer and build its report
pub fn execute(request: &AnalysisRequest) -> anyhow::Result<Report> {
    let counts = request.counts();
    let input = ExperimentInput::new(
        counts.visitors_a,
        counts.conversions_a,
        counts.visitors_b,
        counts.conversions_b,
    )?;
    tracing::debug!(
        "A: {}/{} ({:.4}), B: {}/{} ({:.4})",
        input.control.conversions,
        input.control.visitors,
        input.control_cr,
        input.variant.conversions,
        input.variant.visitors,
        input.variant_cr
    );

    let start = Instant::now();
    let report = match request {
        AnalysisRequest::Bayesian {
            sampling,
            seed,
            options,
            ..
        } => {
            let result = match seed {
                Some(seed) => {
                    tracing::debug!("Sampling {} draws per variant, seed {}", sampling.samples, seed);
                    compute_posterior_seeded(&input, sampling, *seed)?
                }
                None => {
                    tracing::debug!("Sampling {} draws per variant", sampling.samples);
                    compute_posterior(&input, sampling)?
                }
            };
            build_bayesian_report(&result, options)?
        }
        AnalysisRequest::Frequentist { alpha, tails, .. } => {
            let config = FrequentistConfig {
                alpha: *alpha,
                tails: *tails,
            };
            tracing::debug!("z-test at alpha {} ({})", config.alpha, config.tails);
            let result = run_z_test(&input, &config)?;
            build_frequentist_report(&result)
        }
    };
    tracing::debug!(
        "{} analysis finished in {:.2} ms",
        report.method(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(report)
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat, style: &ReportStyle) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Markdown => generate_markdown_report(report, style),
        OutputFormat::Csv => generate_csv_report(report),
        OutputFormat::Human => format_human_output(report, style),
    };
    Ok(output)
}
