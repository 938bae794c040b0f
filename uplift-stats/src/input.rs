//! Experiment Input
//!
//! Raw visitor and conversion counts for the control (A) and variant (B)
//! arms, validated once and shared by both analyzers.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Which side of the experiment a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arm {
    /// Control, labelled "A"
    #[serde(rename = "A")]
    Control,
    /// Variant, labelled "B"
    #[serde(rename = "B")]
    Variant,
}

impl Arm {
    /// Short label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Arm::Control => "A",
            Arm::Variant => "B",
        }
    }
}

impl std::fmt::Display for Arm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts observed for one arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmCounts {
    /// Number of visitors (trials)
    pub visitors: u64,
    /// Number of conversions (successes)
    pub conversions: u64,
}

impl ArmCounts {
    /// Create counts for one arm without validation
    pub fn new(visitors: u64, conversions: u64) -> Self {
        Self {
            visitors,
            conversions,
        }
    }

    /// Visitors that did not convert
    pub fn failures(&self) -> u64 {
        self.visitors.saturating_sub(self.conversions)
    }

    fn validate(&self, arm: Arm) -> Result<(), AnalysisError> {
        if self.visitors == 0 {
            return Err(AnalysisError::DivisionByZero { arm });
        }
        if self.conversions > self.visitors {
            return Err(AnalysisError::conversions_exceed_visitors(
                arm,
                self.conversions,
                self.visitors,
            ));
        }
        Ok(())
    }

    fn rate(&self) -> f64 {
        self.conversions as f64 / self.visitors as f64
    }
}

/// Validated experiment data with eagerly derived conversion rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentInput {
    /// Control arm counts
    pub control: ArmCounts,
    /// Variant arm counts
    pub variant: ArmCounts,
    /// conversions_A / visitors_A
    pub control_cr: f64,
    /// conversions_B / visitors_B
    pub variant_cr: f64,
    /// variant_cr / control_cr - 1, undefined when the control never converts
    pub relative_difference: Option<f64>,
}

impl ExperimentInput {
    /// Validate raw counts and derive conversion rates.
    ///
    /// Fails with [`AnalysisError::DivisionByZero`] when an arm has no visitors
    /// and [`AnalysisError::InvalidInput`] when conversions exceed visitors.
    pub fn new(
        visitors_a: u64,
        conversions_a: u64,
        visitors_b: u64,
        conversions_b: u64,
    ) -> Result<Self, AnalysisError> {
        Self::from_counts(
            ArmCounts::new(visitors_a, conversions_a),
            ArmCounts::new(visitors_b, conversions_b),
        )
    }

    /// Same as [`ExperimentInput::new`] from per-arm counts
    pub fn from_counts(control: ArmCounts, variant: ArmCounts) -> Result<Self, AnalysisError> {
        control.validate(Arm::Control)?;
        variant.validate(Arm::Variant)?;

        let control_cr = control.rate();
        let variant_cr = variant.rate();
        let relative_difference = if control_cr > 0.0 {
            Some(variant_cr / control_cr - 1.0)
        } else {
            None
        };

        Ok(Self {
            control,
            variant,
            control_cr,
            variant_cr,
            relative_difference,
        })
    }

    /// Counts for the requested arm
    pub fn arm(&self, arm: Arm) -> &ArmCounts {
        match arm {
            Arm::Control => &self.control,
            Arm::Variant => &self.variant,
        }
    }

    /// Conversion rate for the requested arm
    pub fn conversion_rate(&self, arm: Arm) -> f64 {
        match arm {
            Arm::Control => self.control_cr,
            Arm::Variant => self.variant_cr,
        }
    }

    /// variant_cr - control_cr
    pub fn absolute_difference(&self) -> f64 {
        self.variant_cr - self.control_cr
    }

    /// Total visitors across both arms
    pub fn total_visitors(&self) -> u64 {
        self.control.visitors + self.variant.visitors
    }

    /// Total conversions across both arms
    pub fn total_conversions(&self) -> u64 {
        self.control.conversions + self.variant.conversions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rates() {
        let input = ExperimentInput::new(50_000, 1_500, 50_000, 1_560).unwrap();
        assert!((input.control_cr - 0.03).abs() < 1e-12);
        assert!((input.variant_cr - 0.0312).abs() < 1e-12);
        assert!((input.relative_difference.unwrap() - 0.04).abs() < 1e-9);
        assert!((input.absolute_difference() - 0.0012).abs() < 1e-12);
        assert_eq!(input.total_visitors(), 100_000);
        assert_eq!(input.total_conversions(), 3_060);
    }

    #[test]
    fn test_zero_visitors() {
        assert_eq!(
            ExperimentInput::new(0, 0, 100, 10),
            Err(AnalysisError::DivisionByZero { arm: Arm::Control })
        );
        assert_eq!(
            ExperimentInput::new(100, 10, 0, 0),
            Err(AnalysisError::DivisionByZero { arm: Arm::Variant })
        );
    }

    #[test]
    fn test_conversions_exceed_visitors() {
        let err = ExperimentInput::new(100, 10, 100, 101).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidInput {
                arm: Arm::Variant,
                ..
            }
        ));
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn test_zero_control_rate_has_no_relative_difference() {
        let input = ExperimentInput::new(100, 0, 100, 5).unwrap();
        assert_eq!(input.control_cr, 0.0);
        assert!(input.relative_difference.is_none());
    }

    #[test]
    fn test_boundary_counts_accepted() {
        let input = ExperimentInput::new(10, 10, 10, 0).unwrap();
        assert_eq!(input.control_cr, 1.0);
        assert_eq!(input.variant_cr, 0.0);
        assert_eq!(input.relative_difference, Some(-1.0));
        assert_eq!(input.variant.failures(), 10);
    }

    #[test]
    fn test_arm_labels() {
        assert_eq!(Arm::Control.to_string(), "A");
        assert_eq!(Arm::Variant.label(), "B");
    }
}
