//! Standard normal distribution helpers

use statrs::distribution::{ContinuousCDF, Normal};

/// Cumulative distribution function of N(0, 1)
pub fn standard_normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Quantile (inverse CDF) of N(0, 1); `p` must lie in (0, 1)
pub fn standard_normal_ppf(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}
