//! Bayesian Posterior Comparison
//!
//! Models each arm's true conversion rate as a Beta random variable with a
//! uniform `Beta(1, 1)` prior. The conjugate posterior after observing `c`
//! conversions out of `v` visitors is `Beta(1 + c, 1 + v - c)`.
//!
//! P(B better than A) is estimated by Monte Carlo: draw the same number of
//! samples from both posteriors and count the pairs where B wins. The estimate
//! converges at the usual `1/sqrt(N)` rate; with the default 50,000 draws its
//! standard error is at most ~0.0022. [`closed_form_prob_b_better`] gives the
//! exact value for cross-checking.

use crate::error::AnalysisError;
use crate::input::{Arm, ArmCounts, ExperimentInput};
use crate::{DEFAULT_POSTERIOR_SAMPLES, PRIOR_ALPHA, PRIOR_BETA};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, thread_rng};
use rand_distr::{Beta, Distribution};
use serde::Serialize;
use statrs::function::beta::ln_beta;
use std::collections::BTreeMap;

/// Upper bound on bins produced by [`BayesianResult::uplift_histogram`]
pub const MAX_HISTOGRAM_BINS: usize = 100_000;

/// Posterior sampling configuration
#[derive(Debug, Clone)]
pub struct BayesianConfig {
    /// Draws per arm (default: 50,000)
    pub samples: usize,
    /// Sample both arms concurrently
    pub parallel: bool,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_POSTERIOR_SAMPLES,
            parallel: true,
        }
    }
}

impl BayesianConfig {
    /// Reject configurations that cannot produce an estimate
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.samples == 0 {
            return Err(AnalysisError::InvalidConfig(
                "posterior sample count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Beta posterior of one arm's conversion rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BetaPosterior {
    /// Shape parameter: prior alpha + conversions
    pub alpha: f64,
    /// Shape parameter: prior beta + non-conversions
    pub beta: f64,
}

impl BetaPosterior {
    /// Conjugate update of the uniform prior with one arm's counts
    pub fn from_counts(counts: &ArmCounts) -> Self {
        Self {
            alpha: PRIOR_ALPHA + counts.conversions as f64,
            beta: PRIOR_BETA + counts.failures() as f64,
        }
    }

    /// Posterior mean
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Posterior variance
    pub fn variance(&self) -> f64 {
        let total = self.alpha + self.beta;
        self.alpha * self.beta / (total * total * (total + 1.0))
    }

    fn distribution(&self, arm: Arm) -> Result<Beta<f64>, AnalysisError> {
        Beta::new(self.alpha, self.beta).map_err(|e| AnalysisError::InvalidInput {
            arm,
            reason: format!(
                "posterior Beta({}, {}) is not a valid distribution: {}",
                self.alpha, self.beta, e
            ),
        })
    }
}

/// Outcome of a posterior comparison
#[derive(Debug, Clone)]
pub struct BayesianResult {
    /// Validated counts and conversion rates
    pub input: ExperimentInput,
    /// Posterior of the control
    pub posterior_a: BetaPosterior,
    /// Posterior of the variant
    pub posterior_b: BetaPosterior,
    /// Draws from the control posterior
    pub samples_a: Vec<f64>,
    /// Draws from the variant posterior
    pub samples_b: Vec<f64>,
    /// Share of draws where A beats B; always `1 - prob_b_better`
    pub prob_a_better: f64,
    /// Share of draws where B strictly beats A
    pub prob_b_better: f64,
}

/// Equal-tailed credible interval of the relative uplift
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpliftInterval {
    /// Mean of the simulated uplift
    pub mean: f64,
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
    /// Credible level (e.g. 0.95)
    pub level: f64,
}

/// One histogram bin, `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive lower edge
    pub lower: f64,
    /// Exclusive upper edge
    pub upper: f64,
    /// Share of all draws that fell in this bin
    pub fraction: f64,
}

/// Simulated uplift split into losses (< 0) and gains (> 0)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpliftHistogram {
    /// Bin width
    pub bin_width: f64,
    /// Bins below zero, ascending; empty when B never loses
    pub losses: Vec<HistogramBin>,
    /// Bins above zero, ascending; empty when B never wins
    pub gains: Vec<HistogramBin>,
}

impl UpliftHistogram {
    /// Share of draws falling in any loss bin
    pub fn loss_fraction(&self) -> f64 {
        self.losses.iter().map(|b| b.fraction).sum()
    }

    /// Share of draws falling in any gain bin
    pub fn gain_fraction(&self) -> f64 {
        self.gains.iter().map(|b| b.fraction).sum()
    }
}

impl BayesianResult {
    /// Number of draws per arm
    pub fn sample_count(&self) -> usize {
        self.samples_a.len()
    }

    /// Elementwise `samples_b / samples_a - 1`
    pub fn relative_uplift(&self) -> Vec<f64> {
        self.samples_b
            .iter()
            .zip(&self.samples_a)
            .map(|(b, a)| b / a - 1.0)
            .collect()
    }

    /// Credible interval and mean of the relative uplift at `level`
    pub fn uplift_interval(&self, level: f64) -> Result<UpliftInterval, AnalysisError> {
        if !(level > 0.0 && level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "credible level {} must be between 0 and 1",
                level
            )));
        }

        let mut uplift: Vec<f64> = self
            .relative_uplift()
            .into_iter()
            .filter(|u| u.is_finite())
            .collect();
        if uplift.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "no finite uplift samples to summarise".to_string(),
            ));
        }
        uplift.sort_by(|a, b| a.total_cmp(b));

        let n = uplift.len();
        let tail = (1.0 - level) / 2.0;
        let lower_idx = (tail * n as f64) as usize;
        let upper_idx = (((1.0 - tail) * n as f64) as usize).min(n - 1);

        Ok(UpliftInterval {
            mean: uplift.iter().sum::<f64>() / n as f64,
            lower: uplift[lower_idx],
            upper: uplift[upper_idx],
            level,
        })
    }

    /// Bin the relative uplift with bins anchored at zero.
    ///
    /// Bin `i` covers `[i * bin_width, (i + 1) * bin_width)`, so the loss side
    /// starts at the smallest loss rounded down to a multiple of `bin_width`.
    /// The gain side always starts at zero rather than at the smallest gain,
    /// keeping both sides on one grid. Draws with an uplift of exactly zero
    /// belong to neither side. Fractions are relative to the total number of
    /// draws.
    ///
    /// Fails with [`AnalysisError::InvalidConfig`] when `bin_width` is not
    /// positive or would produce more than [`MAX_HISTOGRAM_BINS`] bins.
    pub fn uplift_histogram(&self, bin_width: f64) -> Result<UpliftHistogram, AnalysisError> {
        if !(bin_width > 0.0 && bin_width.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "histogram bin width {} must be positive",
                bin_width
            )));
        }

        let uplift: Vec<f64> = self
            .relative_uplift()
            .into_iter()
            .filter(|u| *u != 0.0 && u.is_finite())
            .collect();
        if uplift.is_empty() {
            return Ok(UpliftHistogram {
                bin_width,
                losses: Vec::new(),
                gains: Vec::new(),
            });
        }

        // Bound the bin count in f64 first; tiny widths overflow i64 indices
        let (min_u, max_u) = uplift
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &u| {
                (lo.min(u), hi.max(u))
            });
        let first_bin = (min_u / bin_width).floor().min(0.0);
        let last_bin = (max_u / bin_width).floor().max(-1.0);
        let span = last_bin - first_bin + 1.0;
        if !(span <= MAX_HISTOGRAM_BINS as f64) {
            return Err(AnalysisError::InvalidConfig(format!(
                "bin width {} yields {} bins (max {})",
                bin_width, span, MAX_HISTOGRAM_BINS
            )));
        }

        let total = self.sample_count().max(1) as f64;
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for u in &uplift {
            *counts.entry((u / bin_width).floor() as i64).or_default() += 1;
        }
        let first = first_bin as i64;
        let last = last_bin as i64;

        let bin = |i: i64| HistogramBin {
            lower: i as f64 * bin_width,
            upper: (i + 1) as f64 * bin_width,
            fraction: counts.get(&i).copied().unwrap_or(0) as f64 / total,
        };

        let losses = if min_u < 0.0 {
            (first..0).map(bin).collect()
        } else {
            Vec::new()
        };
        let gains = if max_u > 0.0 {
            (0..=last).map(bin).collect()
        } else {
            Vec::new()
        };

        Ok(UpliftHistogram {
            bin_width,
            losses,
            gains,
        })
    }
}

/// Compare posteriors using the thread-local generator
pub fn compute_posterior(
    input: &ExperimentInput,
    config: &BayesianConfig,
) -> Result<BayesianResult, AnalysisError> {
    compute_posterior_with_rng(input, config, &mut thread_rng())
}

/// Compare posteriors with a reproducible seed
pub fn compute_posterior_seeded(
    input: &ExperimentInput,
    config: &BayesianConfig,
    seed: u64,
) -> Result<BayesianResult, AnalysisError> {
    compute_posterior_with_rng(input, config, &mut StdRng::seed_from_u64(seed))
}

/// Compare posteriors drawing from the given random source.
///
/// Each arm gets its own stream seeded from `rng`, so the draws are the same
/// whether or not the arms are sampled in parallel.
pub fn compute_posterior_with_rng<R: Rng + ?Sized>(
    input: &ExperimentInput,
    config: &BayesianConfig,
    rng: &mut R,
) -> Result<BayesianResult, AnalysisError> {
    config.validate()?;

    let posterior_a = BetaPosterior::from_counts(&input.control);
    let posterior_b = BetaPosterior::from_counts(&input.variant);
    let dist_a = posterior_a.distribution(Arm::Control)?;
    let dist_b = posterior_b.distribution(Arm::Variant)?;

    let mut rng_a = StdRng::seed_from_u64(rng.next_u64());
    let mut rng_b = StdRng::seed_from_u64(rng.next_u64());
    let n = config.samples;

    let (samples_a, samples_b) = if config.parallel {
        rayon::join(
            || draw(&dist_a, n, &mut rng_a),
            || draw(&dist_b, n, &mut rng_b),
        )
    } else {
        (draw(&dist_a, n, &mut rng_a), draw(&dist_b, n, &mut rng_b))
    };

    let wins_b = samples_b
        .iter()
        .zip(&samples_a)
        .filter(|(b, a)| b > a)
        .count();
    let prob_b_better = wins_b as f64 / n as f64;

    Ok(BayesianResult {
        input: input.clone(),
        posterior_a,
        posterior_b,
        samples_a,
        samples_b,
        prob_a_better: 1.0 - prob_b_better,
        prob_b_better,
    })
}

fn draw<R: Rng>(dist: &Beta<f64>, n: usize, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| dist.sample(rng)).collect()
}

/// Exact P(B > A) for the two Beta posteriors.
///
/// Sums `B(αA + i, βA + βB) / ((βB + i) · B(1 + i, βB) · B(αA, βA))` for
/// `i` in `0..αB`, in log space. Cost is linear in the variant's conversions.
pub fn closed_form_prob_b_better(input: &ExperimentInput) -> f64 {
    let a = BetaPosterior::from_counts(&input.control);
    let b = BetaPosterior::from_counts(&input.variant);
    let ln_beta_a = ln_beta(a.alpha, a.beta);

    let total: f64 = (0..input.variant.conversions + 1)
        .map(|i| {
            let i = i as f64;
            let log_num = ln_beta(a.alpha + i, a.beta + b.beta);
            let log_den = (b.beta + i).ln() + ln_beta(1.0 + i, b.beta) + ln_beta_a;
            (log_num - log_den).exp()
        })
        .sum();

    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(va: u64, ca: u64, vb: u64, cb: u64) -> ExperimentInput {
        ExperimentInput::new(va, ca, vb, cb).unwrap()
    }

    #[test]
    fn test_posterior_parameters() {
        let p = BetaPosterior::from_counts(&ArmCounts::new(100, 7));
        assert_eq!(p.alpha, 8.0);
        assert_eq!(p.beta, 94.0);
        assert!((p.mean() - 8.0 / 102.0).abs() < 1e-12);
        assert!(p.variance() > 0.0);
    }

    #[test]
    fn test_boundary_posteriors_stay_positive() {
        let none = BetaPosterior::from_counts(&ArmCounts::new(500, 0));
        assert_eq!((none.alpha, none.beta), (1.0, 501.0));

        let all = BetaPosterior::from_counts(&ArmCounts::new(500, 500));
        assert_eq!((all.alpha, all.beta), (501.0, 1.0));

        let config = BayesianConfig {
            samples: 2_000,
            ..Default::default()
        };
        let result = compute_posterior_seeded(&input(500, 0, 500, 500), &config, 1).unwrap();
        assert!(result.samples_a.iter().all(|&s| (0.0..=1.0).contains(&s)));
        assert!(result.samples_b.iter().all(|&s| (0.0..=1.0).contains(&s)));
        assert!(result.prob_b_better > 0.999);
    }

    #[test]
    fn test_default_sample_count() {
        let result = compute_posterior(&input(1_000, 50, 1_000, 55), &BayesianConfig::default())
            .unwrap();
        assert_eq!(result.samples_a.len(), DEFAULT_POSTERIOR_SAMPLES);
        assert_eq!(result.samples_b.len(), DEFAULT_POSTERIOR_SAMPLES);
    }

    #[test]
    fn test_probabilities_are_complementary() {
        let result =
            compute_posterior_seeded(&input(80_000, 1_600, 80_000, 1_696), &Default::default(), 7)
                .unwrap();
        assert_eq!(result.prob_a_better + result.prob_b_better, 1.0);
        assert!(result.prob_b_better > 0.9 && result.prob_b_better < 0.99);
    }

    #[test]
    fn test_clear_winner() {
        let result =
            compute_posterior_seeded(&input(10_000, 100, 10_000, 500), &Default::default(), 42)
                .unwrap();
        assert!(result.prob_b_better > 0.99);
        assert!(result.prob_a_better < 0.01);
    }

    #[test]
    fn test_seed_is_reproducible_across_parallel_modes() {
        let data = input(2_000, 60, 2_000, 75);
        let parallel = BayesianConfig {
            samples: 5_000,
            parallel: true,
        };
        let serial = BayesianConfig {
            samples: 5_000,
            parallel: false,
        };

        let a = compute_posterior_seeded(&data, &parallel, 99).unwrap();
        let b = compute_posterior_seeded(&data, &serial, 99).unwrap();
        assert_eq!(a.samples_a, b.samples_a);
        assert_eq!(a.samples_b, b.samples_b);
        assert_eq!(a.prob_b_better, b.prob_b_better);
    }

    #[test]
    fn test_arms_use_independent_streams() {
        let result =
            compute_posterior_seeded(&input(1_000, 100, 1_000, 100), &Default::default(), 3)
                .unwrap();
        assert_ne!(result.samples_a, result.samples_b);
        assert!((result.prob_b_better - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let config = BayesianConfig {
            samples: 0,
            ..Default::default()
        };
        assert!(matches!(
            compute_posterior(&input(10, 1, 10, 2), &config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_relative_uplift_is_elementwise() {
        let config = BayesianConfig {
            samples: 100,
            ..Default::default()
        };
        let result = compute_posterior_seeded(&input(1_000, 30, 1_000, 40), &config, 5).unwrap();
        let uplift = result.relative_uplift();
        assert_eq!(uplift.len(), 100);
        for (i, u) in uplift.iter().enumerate() {
            let expected = result.samples_b[i] / result.samples_a[i] - 1.0;
            assert_eq!(*u, expected);
        }
    }

    #[test]
    fn test_uplift_interval_brackets_observed_difference() {
        let data = input(50_000, 1_500, 50_000, 1_560);
        let result = compute_posterior_seeded(&data, &Default::default(), 11).unwrap();
        let interval = result.uplift_interval(0.95).unwrap();
        let observed = data.relative_difference.unwrap();
        assert!(interval.lower < observed && observed < interval.upper);
        assert!((interval.mean - observed).abs() < 0.01);
        assert!(result.uplift_interval(1.0).is_err());
        assert!(result.uplift_interval(0.0).is_err());
    }

    #[test]
    fn test_uplift_histogram_partitions_draws() {
        let result =
            compute_posterior_seeded(&input(5_000, 150, 5_000, 160), &Default::default(), 21)
                .unwrap();
        let hist = result.uplift_histogram(0.01).unwrap();

        assert!(!hist.losses.is_empty());
        assert!(!hist.gains.is_empty());
        assert_eq!(hist.losses.last().unwrap().upper, 0.0);
        assert_eq!(hist.gains.first().unwrap().lower, 0.0);
        for pair in hist.gains.windows(2) {
            assert!((pair[0].upper - pair[1].lower).abs() < 1e-12);
        }

        let covered = hist.loss_fraction() + hist.gain_fraction();
        assert!((covered - 1.0).abs() < 1e-9);
        assert!((hist.gain_fraction() - result.prob_b_better).abs() < 1e-9);
    }

    #[test]
    fn test_uplift_histogram_one_sided() {
        let result =
            compute_posterior_seeded(&input(10_000, 100, 10_000, 1_000), &Default::default(), 8)
                .unwrap();
        let hist = result.uplift_histogram(0.5).unwrap();
        assert!(hist.losses.is_empty());
        assert_eq!(hist.gains[0].lower, 0.0);
        assert_eq!(hist.gains[0].fraction, 0.0);
        assert!((hist.gain_fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uplift_histogram_rejects_bad_width() {
        let config = BayesianConfig {
            samples: 10,
            ..Default::default()
        };
        let result = compute_posterior_seeded(&input(100, 10, 100, 12), &config, 2).unwrap();
        assert!(result.uplift_histogram(0.0).is_err());
        assert!(result.uplift_histogram(-0.01).is_err());
        assert!(result.uplift_histogram(f64::NAN).is_err());
    }

    #[test]
    fn test_uplift_histogram_rejects_too_many_bins() {
        let config = BayesianConfig {
            samples: 5_000,
            ..Default::default()
        };
        let result = compute_posterior_seeded(&input(5_000, 150, 5_000, 160), &config, 21).unwrap();

        // Indices past i64 range must be rejected, not overflow
        for width in [1e-300, f64::MIN_POSITIVE, 1e-7] {
            assert!(matches!(
                result.uplift_histogram(width),
                Err(AnalysisError::InvalidConfig(_))
            ));
        }
        assert!(result.uplift_histogram(0.01).is_ok());
    }

    #[test]
    fn test_closed_form_matches_monte_carlo() {
        let data = input(80_000, 1_600, 80_000, 1_696);
        let exact = closed_form_prob_b_better(&data);
        let result = compute_posterior_seeded(&data, &Default::default(), 17).unwrap();
        // Five standard errors at N = 50,000
        assert!((exact - result.prob_b_better).abs() < 0.011);
    }

    #[test]
    fn test_closed_form_symmetry() {
        let exact = closed_form_prob_b_better(&input(1_000, 40, 1_000, 40));
        assert!((exact - 0.5).abs() < 1e-6);

        let forward = closed_form_prob_b_better(&input(1_000, 30, 1_000, 45));
        let backward = closed_form_prob_b_better(&input(1_000, 45, 1_000, 30));
        assert!((forward + backward - 1.0).abs() < 1e-6);
    }
}
