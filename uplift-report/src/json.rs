//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_frequentist_report;
    use uplift_stats::{ExperimentInput, FrequentistConfig, run_z_test};

    #[test]
    fn test_json_roundtrip_fields() {
        let input = ExperimentInput::new(50_000, 1_500, 50_000, 1_560).unwrap();
        let result = run_z_test(&input, &FrequentistConfig::default()).unwrap();
        let json = generate_json_report(&build_frequentist_report(&result)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["analysis"]["method"], "frequentist");
        assert_eq!(value["analysis"]["tail_direction"], "two");
        assert_eq!(value["analysis"]["tails"], "two");
        assert_eq!(value["analysis"]["significant"], false);
        assert_eq!(value["variants"][0]["label"], "A");
        assert!(value["variants"][0]["uplift"].is_null());

        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.method(), "frequentist");
    }
}
