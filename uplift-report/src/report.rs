//! Report Data Structures

use crate::ReportError;
use crate::style::ReportStyle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uplift_stats::{
    Arm, BayesianResult, BetaPosterior, ExperimentInput, FrequentistResult, HistogramBin,
    TailDirection, TailMode, UpliftHistogram, UpliftInterval,
};

/// Report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema and run metadata
    pub meta: ReportMeta,
    /// One row per variant, A first
    pub variants: Vec<VariantRow>,
    /// Method-specific results
    pub analysis: Analysis,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// Version of the crate that produced the report
    pub version: String,
    /// When the report was built
    pub timestamp: DateTime<Utc>,
}

impl ReportMeta {
    fn now() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One row of the variant table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantRow {
    /// "A" or "B"
    pub label: String,
    /// Visitors (trials)
    pub visitors: u64,
    /// Conversions (successes)
    pub conversions: u64,
    /// conversions / visitors
    pub conversion_rate: f64,
    /// Relative difference to A (B only, absent when A never converts)
    pub uplift: Option<f64>,
    /// Posterior probability of being the better variant (Bayesian only)
    pub likelihood_of_being_better: Option<f64>,
}

/// Method-specific results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Analysis {
    /// Posterior comparison
    Bayesian(BayesianSummary),
    /// Two-proportion z-test
    Frequentist(FrequentistSummary),
}

/// Bayesian section of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianSummary {
    /// Posterior draws per variant
    pub samples: usize,
    /// Posterior of A
    pub posterior_a: PosteriorParams,
    /// Posterior of B
    pub posterior_b: PosteriorParams,
    /// Share of draws where A is at least as good as B
    pub prob_a_better: f64,
    /// Share of draws where B beats A
    pub prob_b_better: f64,
    /// Observed relative difference of B over A
    pub relative_difference: Option<f64>,
    /// Mean simulated relative uplift
    pub uplift_mean: f64,
    /// Lower bound of the uplift credible interval
    pub uplift_ci_lower: f64,
    /// Upper bound of the uplift credible interval
    pub uplift_ci_upper: f64,
    /// Credible level of the interval
    pub credible_level: f64,
    /// Binned relative uplift
    pub histogram: Histogram,
}

/// Beta posterior parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PosteriorParams {
    /// Conversions + 1
    pub alpha: f64,
    /// Non-conversions + 1
    pub beta: f64,
    /// Posterior mean
    pub mean: f64,
}

impl From<&BetaPosterior> for PosteriorParams {
    fn from(p: &BetaPosterior) -> Self {
        Self {
            alpha: p.alpha,
            beta: p.beta,
            mean: p.mean(),
        }
    }
}

/// Binned relative uplift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin width
    pub bin_width: f64,
    /// Bins below zero, ascending
    pub losses: Vec<Bin>,
    /// Bins from zero up, ascending
    pub gains: Vec<Bin>,
}

/// Histogram bin `[lower, upper)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bin {
    /// Inclusive lower edge
    pub lower: f64,
    /// Exclusive upper edge
    pub upper: f64,
    /// Share of all draws in the bin
    pub fraction: f64,
}

impl From<&HistogramBin> for Bin {
    fn from(b: &HistogramBin) -> Self {
        Self {
            lower: b.lower,
            upper: b.upper,
            fraction: b.fraction,
        }
    }
}

impl From<&UpliftHistogram> for Histogram {
    fn from(h: &UpliftHistogram) -> Self {
        Self {
            bin_width: h.bin_width,
            losses: h.losses.iter().map(Bin::from).collect(),
            gains: h.gains.iter().map(Bin::from).collect(),
        }
    }
}

/// Frequentist section of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentistSummary {
    /// Significance level
    pub alpha: f64,
    /// One or two tails
    pub tails: TailMode,
    /// Tail the p-value was taken from
    pub tail_direction: TailDirection,
    /// Observed relative difference of B over A
    pub relative_difference: Option<f64>,
    /// Standard error of A
    pub control_se: f64,
    /// Standard error of B
    pub variant_se: f64,
    /// Unpooled standard error of the difference
    pub se_difference: f64,
    /// Pooled standard error
    pub combined_se: f64,
    /// Test statistic
    pub z_score: f64,
    /// p-value in the resolved tail
    pub p_value: f64,
    /// Observed power
    pub power: f64,
    /// Critical value of the standard normal
    pub critical_z: f64,
    /// Conversion rates of B that start rejecting the null
    pub critical_values: Vec<f64>,
    /// Relative difference needed for significance
    pub minimum_detectable_effect: Option<f64>,
    /// p-value below alpha
    pub significant: bool,
}

/// Options for the Bayesian section
#[derive(Debug, Clone, Copy)]
pub struct BayesianReportOptions {
    /// Credible level of the uplift interval
    pub credible_level: f64,
    /// Width of the uplift histogram bins
    pub histogram_bin_width: f64,
}

impl Default for BayesianReportOptions {
    fn default() -> Self {
        Self {
            credible_level: 0.95,
            histogram_bin_width: 0.01,
        }
    }
}

fn variant_rows(input: &ExperimentInput, likelihood: Option<(f64, f64)>) -> Vec<VariantRow> {
    [Arm::Control, Arm::Variant]
        .into_iter()
        .map(|arm| {
            let counts = input.arm(arm);
            VariantRow {
                label: arm.label().to_string(),
                visitors: counts.visitors,
                conversions: counts.conversions,
                conversion_rate: input.conversion_rate(arm),
                uplift: match arm {
                    Arm::Control => None,
                    Arm::Variant => input.relative_difference,
                },
                likelihood_of_being_better: likelihood.map(|(a, b)| match arm {
                    Arm::Control => a,
                    Arm::Variant => b,
                }),
            }
        })
        .collect()
}

/// Build a report from a posterior comparison
pub fn build_bayesian_report(
    result: &BayesianResult,
    options: &BayesianReportOptions,
) -> Result<Report, ReportError> {
    let UpliftInterval {
        mean,
        lower,
        upper,
        level,
    } = result.uplift_interval(options.credible_level)?;
    let histogram = result.uplift_histogram(options.histogram_bin_width)?;

    Ok(Report {
        meta: ReportMeta::now(),
        variants: variant_rows(
            &result.input,
            Some((result.prob_a_better, result.prob_b_better)),
        ),
        analysis: Analysis::Bayesian(BayesianSummary {
            samples: result.sample_count(),
            posterior_a: (&result.posterior_a).into(),
            posterior_b: (&result.posterior_b).into(),
            prob_a_better: result.prob_a_better,
            prob_b_better: result.prob_b_better,
            relative_difference: result.input.relative_difference,
            uplift_mean: mean,
            uplift_ci_lower: lower,
            uplift_ci_upper: upper,
            credible_level: level,
            histogram: (&histogram).into(),
        }),
    })
}

/// Build a report from a z-test
pub fn build_frequentist_report(result: &FrequentistResult) -> Report {
    Report {
        meta: ReportMeta::now(),
        variants: variant_rows(&result.input, None),
        analysis: Analysis::Frequentist(FrequentistSummary {
            alpha: result.alpha,
            tails: result.tails,
            tail_direction: result.tail_direction,
            relative_difference: result.input.relative_difference,
            control_se: result.control_se,
            variant_se: result.variant_se,
            se_difference: result.se_difference,
            combined_se: result.combined_se,
            z_score: result.z_score,
            p_value: result.p_value,
            power: result.power,
            critical_z: result.critical_z,
            critical_values: result.critical_values(),
            minimum_detectable_effect: result.minimum_detectable_effect(),
            significant: result.is_significant(),
        }),
    }
}

impl Report {
    /// Analysis method name
    pub fn method(&self) -> &'static str {
        match self.analysis {
            Analysis::Bayesian(_) => "bayesian",
            Analysis::Frequentist(_) => "frequentist",
        }
    }

    /// One-paragraph conclusion of the analysis
    pub fn headline(&self, style: &ReportStyle) -> String {
        match &self.analysis {
            Analysis::Bayesian(b) => {
                let mut text = format!(
                    "There is a {} chance that variant B provides a better experience",
                    style.percent(b.prob_b_better)
                );
                match b.relative_difference {
                    Some(rd) => text.push_str(&format!(
                        ", with the expected difference being on average {} (relative).",
                        style.percent(rd)
                    )),
                    None => text.push_str(
                        "; the relative difference is undefined because A has no conversions.",
                    ),
                }
                text
            }
            Analysis::Frequentist(f) => {
                let confidence = style.whole_percent(1.0 - f.alpha);
                let risk = style.whole_percent(f.alpha);
                match (f.significant, f.relative_difference) {
                    (true, Some(rd)) => format!(
                        "Significant: B's conversion rate is {} {} than A's. You can be {} \
                         confident that the result is due to the changes made; there is a {} \
                         chance that it is a false positive (type I error).",
                        style.percent(rd.abs()),
                        if rd < 0.0 { "lower" } else { "higher" },
                        confidence,
                        risk
                    ),
                    (true, None) => format!(
                        "Significant at {} confidence: B converts while A never does.",
                        confidence
                    ),
                    (false, rd) => {
                        let mut text = match rd {
                            Some(rd) => format!(
                                "Not significant: there is not enough evidence of a {} \
                                 difference in conversion rates between A and B.",
                                style.percent(rd)
                            ),
                            None => "Not significant: there is not enough evidence of a \
                                     difference in conversion rates between A and B."
                                .to_string(),
                        };
                        if let Some(mde) = f.minimum_detectable_effect {
                            text.push_str(&format!(
                                " A relative difference greater than {} is needed.",
                                style.percent(mde)
                            ));
                        }
                        text
                    }
                }
            }
        }
    }
}
