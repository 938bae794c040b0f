//! Analysis Errors

use crate::input::Arm;
use thiserror::Error;

/// Errors raised synchronously by the analyzers.
///
/// None of these are transient: the same inputs always fail the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Counts that cannot describe a conversion experiment
    #[error("invalid input for variant {arm}: {reason}")]
    InvalidInput {
        /// Offending arm
        arm: Arm,
        /// What is wrong with it
        reason: String,
    },

    /// An arm has no visitors, so its conversion rate is undefined
    #[error("variant {arm} has zero visitors")]
    DivisionByZero {
        /// Offending arm
        arm: Arm,
    },

    /// Analysis configuration outside its valid domain
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    pub(crate) fn conversions_exceed_visitors(arm: Arm, conversions: u64, visitors: u64) -> Self {
        AnalysisError::InvalidInput {
            arm,
            reason: format!(
                "{} conversions exceed {} visitors (conversion rate must be between 0 and 1)",
                conversions, visitors
            ),
        }
    }
}
