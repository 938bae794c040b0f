#![warn(missing_docs)]
//! Uplift Statistical Engine
//!
//! Decides whether a variant (B) of a conversion experiment differs from the
//! control (A) under two independent paradigms:
//! - Bayesian posterior comparison: Beta posteriors, Monte Carlo P(B > A),
//!   relative-uplift distribution
//! - Frequentist hypothesis testing: pooled two-proportion z-test, p-value,
//!   observed power, critical values
//!
//! Both analyzers are pure: they validate their input, compute, and return an
//! owned result. Nothing here performs I/O or logs.

mod bayesian;
mod error;
mod frequentist;
mod input;
mod normal;

pub use bayesian::{
    BayesianConfig, BayesianResult, BetaPosterior, HistogramBin, MAX_HISTOGRAM_BINS,
    UpliftHistogram, UpliftInterval, closed_form_prob_b_better, compute_posterior,
    compute_posterior_seeded, compute_posterior_with_rng,
};
pub use error::AnalysisError;
pub use frequentist::{
    FrequentistConfig, FrequentistResult, SignificanceLevel, TailDirection, TailMode,
    critical_z, observed_power, run_z_test, z_test,
};
pub use input::{Arm, ArmCounts, ExperimentInput};
pub use normal::{standard_normal_cdf, standard_normal_ppf};

/// Posterior draws per arm
pub const DEFAULT_POSTERIOR_SAMPLES: usize = 50_000;

/// Default significance level (95% confidence)
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Alpha of the uniform Beta prior
pub const PRIOR_ALPHA: f64 = 1.0;

/// Beta of the uniform Beta prior
pub const PRIOR_BETA: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_POSTERIOR_SAMPLES, 50_000);
        assert!((DEFAULT_ALPHA - 0.05).abs() < f64::EPSILON);
        assert_eq!((PRIOR_ALPHA, PRIOR_BETA), (1.0, 1.0));
    }
}
