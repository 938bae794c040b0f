//! Two-Proportion Z-Test
//!
//! Pooled-variance z-test on the difference of conversion rates, with
//! observed power and critical values for a configurable significance level.
//!
//! One-tailed tests pick their tail from the observed data: when B converts
//! worse than A the alternative is "A is better" and the lower tail is used
//! (`Right` in the p-value convention below), otherwise the upper tail (`Left`).

use crate::error::AnalysisError;
use crate::input::ExperimentInput;
use crate::normal::{standard_normal_cdf, standard_normal_ppf};
use crate::DEFAULT_ALPHA;
use serde::{Deserialize, Serialize};

/// Whether the test uses one or both tails of the null distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TailMode {
    /// One tail, direction inferred from the data
    #[serde(alias = "one-tail", alias = "one-tailed")]
    One,
    /// Both tails
    #[default]
    #[serde(alias = "two-tail", alias = "two-tailed")]
    Two,
}

impl TailMode {
    /// Map a two-tailed flag to a tail mode
    pub fn from_two_tailed(two_tailed: bool) -> Self {
        if two_tailed { TailMode::Two } else { TailMode::One }
    }

    /// Whether both tails are used
    pub fn is_two_tailed(self) -> bool {
        matches!(self, TailMode::Two)
    }
}

impl std::str::FromStr for TailMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one" | "one-tail" | "one-tailed" | "1" => Ok(TailMode::One),
            "two" | "two-tail" | "two-tailed" | "2" => Ok(TailMode::Two),
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown tail mode '{}' (expected 'one' or 'two')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TailMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TailMode::One => write!(f, "one-tailed"),
            TailMode::Two => write!(f, "two-tailed"),
        }
    }
}

/// Tail of the standard normal used for the p-value and critical values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailDirection {
    /// B appears better; p = cdf(-z)
    Left,
    /// B appears worse; p = cdf(z)
    Right,
    /// p = 2 * cdf(-|z|)
    Two,
}

impl TailDirection {
    /// Resolve the direction for a tail mode against the observed data
    pub fn resolve(tails: TailMode, input: &ExperimentInput) -> Self {
        match tails {
            TailMode::Two => TailDirection::Two,
            // Same sign as relative_difference, and defined when control_cr == 0
            TailMode::One if input.variant_cr < input.control_cr => TailDirection::Right,
            TailMode::One => TailDirection::Left,
        }
    }

    /// p-value of `z_score` under this direction
    pub fn p_value(self, z_score: f64) -> f64 {
        match self {
            TailDirection::Left => standard_normal_cdf(-z_score),
            TailDirection::Right => standard_normal_cdf(z_score),
            TailDirection::Two => 2.0 * standard_normal_cdf(-z_score.abs()),
        }
    }
}

impl std::fmt::Display for TailDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TailDirection::Left => write!(f, "left"),
            TailDirection::Right => write!(f, "right"),
            TailDirection::Two => write!(f, "two"),
        }
    }
}

/// Conventional significance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignificanceLevel {
    /// 90% confidence, alpha = 0.10
    Ninety,
    /// 95% confidence, alpha = 0.05
    NinetyFive,
    /// 99% confidence, alpha = 0.01
    NinetyNine,
}

impl SignificanceLevel {
    /// All presets, lowest confidence first
    pub const ALL: [SignificanceLevel; 3] = [
        SignificanceLevel::Ninety,
        SignificanceLevel::NinetyFive,
        SignificanceLevel::NinetyNine,
    ];

    /// Type I error rate
    pub fn alpha(self) -> f64 {
        match self {
            SignificanceLevel::Ninety => 0.10,
            SignificanceLevel::NinetyFive => 0.05,
            SignificanceLevel::NinetyNine => 0.01,
        }
    }

    /// 1 - alpha
    pub fn confidence(self) -> f64 {
        1.0 - self.alpha()
    }
}

/// Z-test configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequentistConfig {
    /// Significance level, in (0, 1)
    pub alpha: f64,
    /// One or two tails
    pub tails: TailMode,
}

impl Default for FrequentistConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            tails: TailMode::Two,
        }
    }
}

impl From<SignificanceLevel> for FrequentistConfig {
    fn from(level: SignificanceLevel) -> Self {
        Self {
            alpha: level.alpha(),
            ..Default::default()
        }
    }
}

impl FrequentistConfig {
    /// Configuration from a significance level and a two-tailed flag
    pub fn new(alpha: f64, two_tailed: bool) -> Self {
        Self {
            alpha,
            tails: TailMode::from_two_tailed(two_tailed),
        }
    }

    /// Reject alpha outside (0, 1)
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_alpha(self.alpha)
    }
}

fn validate_alpha(alpha: f64) -> Result<(), AnalysisError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidConfig(format!(
            "alpha {} must be strictly between 0 and 1",
            alpha
        )))
    }
}

/// Outcome of a two-proportion z-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentistResult {
    /// Validated counts and conversion rates
    pub input: ExperimentInput,
    /// Significance level the test was run at
    pub alpha: f64,
    /// Tail mode requested by the caller
    pub tails: TailMode,
    /// Tail actually used
    pub tail_direction: TailDirection,
    /// Standard error of the control conversion rate
    pub control_se: f64,
    /// Standard error of the variant conversion rate
    pub variant_se: f64,
    /// Unpooled standard error of the difference
    pub se_difference: f64,
    /// Pooled conversion rate of both arms
    pub combined_cr: f64,
    /// Pooled standard error of the difference
    pub combined_se: f64,
    /// Standardized difference of the conversion rates
    pub z_score: f64,
    /// Probability of a result at least this extreme under the null
    pub p_value: f64,
    /// Observed power at `alpha`
    pub power: f64,
    /// Standard normal quantile bounding the rejection region
    pub critical_z: f64,
}

impl FrequentistResult {
    /// p-value below alpha
    pub fn is_significant(&self) -> bool {
        self.p_value < self.alpha
    }

    /// Probability of a false negative, 1 - power
    pub fn type_ii_error(&self) -> f64 {
        1.0 - self.power
    }

    /// 1 - alpha
    pub fn confidence(&self) -> f64 {
        1.0 - self.alpha
    }

    /// Relative difference needed to reach significance at this alpha.
    ///
    /// `None` when the control never converts.
    pub fn minimum_detectable_effect(&self) -> Option<f64> {
        if self.input.control_cr > 0.0 {
            Some(self.se_difference * self.critical_z / self.input.control_cr)
        } else {
            None
        }
    }

    /// Conversion rates of B at which the test starts rejecting the null,
    /// ascending, one per tail in use
    pub fn critical_values(&self) -> Vec<f64> {
        let offset = self.control_se * self.critical_z;
        let cr = self.input.control_cr;
        match self.tail_direction {
            TailDirection::Left => vec![cr + offset],
            TailDirection::Right => vec![cr - offset],
            TailDirection::Two => vec![cr - offset, cr + offset],
        }
    }

    /// Re-run the test on the same data at a different alpha
    pub fn with_alpha(&self, alpha: f64) -> Result<FrequentistResult, AnalysisError> {
        run_z_test(
            &self.input,
            &FrequentistConfig {
                alpha,
                tails: self.tails,
            },
        )
    }
}

/// Run the z-test, computing every derived quantity once
pub fn run_z_test(
    input: &ExperimentInput,
    config: &FrequentistConfig,
) -> Result<FrequentistResult, AnalysisError> {
    config.validate()?;

    let tail_direction = TailDirection::resolve(config.tails, input);
    let control_se = standard_error(input.control_cr, input.control.visitors);
    let variant_se = standard_error(input.variant_cr, input.variant.visitors);
    let se_difference = (control_se.powi(2) + variant_se.powi(2)).sqrt();

    let (combined_cr, combined_se) = pooled(input);
    let z_score = z_score(input, combined_se);
    let p_value = tail_direction.p_value(z_score);

    Ok(FrequentistResult {
        input: input.clone(),
        alpha: config.alpha,
        tails: config.tails,
        tail_direction,
        control_se,
        variant_se,
        se_difference,
        combined_cr,
        combined_se,
        z_score,
        p_value,
        power: observed_power(input, config.alpha, config.tails)?,
        critical_z: critical_z(config.alpha, config.tails)?,
    })
}

/// z-score and p-value for an explicit tail direction
pub fn z_test(input: &ExperimentInput, direction: TailDirection) -> (f64, f64) {
    let (_, combined_se) = pooled(input);
    let z = z_score(input, combined_se);
    (z, direction.p_value(z))
}

/// Standard normal quantile bounding the rejection region.
///
/// Two-tailed tests split alpha across both tails; the halved value is local
/// and never written back.
pub fn critical_z(alpha: f64, tails: TailMode) -> Result<f64, AnalysisError> {
    validate_alpha(alpha)?;
    let tail_alpha = if tails.is_two_tailed() {
        alpha / 2.0
    } else {
        alpha
    };
    Ok(standard_normal_ppf(1.0 - tail_alpha))
}

/// Observed power of the test at `alpha`.
///
/// Sums the rejection probability of both tails even for one-tailed tests;
/// the far tail contributes almost nothing once the effect is visible.
pub fn observed_power(
    input: &ExperimentInput,
    alpha: f64,
    tails: TailMode,
) -> Result<f64, AnalysisError> {
    let qu = critical_z(alpha, tails)?;
    let n = input.total_visitors() as f64;

    let control_cr = input.control_cr;
    let variant_cr = input.variant_cr;
    let diff = (variant_cr - control_cr).abs();
    let avg_cr = (control_cr + variant_cr) / 2.0;

    let control_var = control_cr * (1.0 - control_cr);
    let variant_var = variant_cr * (1.0 - variant_cr);
    let avg_var = avg_cr * (1.0 - avg_cr);

    let spread = (control_var + variant_var).sqrt();
    if spread == 0.0 {
        // Both rates are 0 or 1: any difference is certain to be detected
        return Ok(if diff > 0.0 { 1.0 } else { 0.0 });
    }

    let shift = n.sqrt() * diff;
    let margin = qu * (2.0 * avg_var).sqrt();
    let power_lower = standard_normal_cdf((shift - margin) / spread);
    let power_upper = 1.0 - standard_normal_cdf((shift + margin) / spread);

    Ok(power_lower + power_upper)
}

fn standard_error(cr: f64, visitors: u64) -> f64 {
    (cr * (1.0 - cr) / visitors as f64).sqrt()
}

fn pooled(input: &ExperimentInput) -> (f64, f64) {
    let combined_cr = input.total_conversions() as f64 / input.total_visitors() as f64;
    let combined_se = (combined_cr
        * (1.0 - combined_cr)
        * (1.0 / input.control.visitors as f64 + 1.0 / input.variant.visitors as f64))
        .sqrt();
    (combined_cr, combined_se)
}

fn z_score(input: &ExperimentInput, combined_se: f64) -> f64 {
    if combined_se == 0.0 {
        // Pooled rate is 0 or 1, so both arms converted identically
        return 0.0;
    }
    input.absolute_difference() / combined_se
}
