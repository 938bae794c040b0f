//! CSV Output
//!
//! One row per variant. Method-specific statistics are reported on the
//! variant (B) row and left empty for the control.

use crate::report::{Analysis, Report};

/// Generate a CSV table of the report
pub fn generate_csv_report(report: &Report) -> String {
    let mut csv = String::new();

    let extra_headers = match report.analysis {
        Analysis::Bayesian(_) => "likelihood_of_being_better,uplift_ci_lower,uplift_ci_upper",
        Analysis::Frequentist(_) => "power,z_score,p_value,significant",
    };
    csv.push_str("method,variant,visitors,conversions,conversion_rate,uplift,");
    csv.push_str(extra_headers);
    csv.push('\n');

    for row in &report.variants {
        let is_variant = row.label == "B";
        let extras = match &report.analysis {
            Analysis::Bayesian(b) => {
                let (lower, upper) = if is_variant {
                    (b.uplift_ci_lower.to_string(), b.uplift_ci_upper.to_string())
                } else {
                    (String::new(), String::new())
                };
                format!(
                    "{},{},{}",
                    optional(row.likelihood_of_being_better),
                    lower,
                    upper
                )
            }
            Analysis::Frequentist(f) if is_variant => {
                format!("{},{},{},{}", f.power, f.z_score, f.p_value, f.significant)
            }
            Analysis::Frequentist(_) => ",,,".to_string(),
        };

        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            report.method(),
            row.label,
            row.visitors,
            row.conversions,
            row.conversion_rate,
            optional(row.uplift),
            extras
        ));
    }

    csv
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_frequentist_report;
    use uplift_stats::{ExperimentInput, FrequentistConfig, run_z_test};

    #[test]
    fn test_frequentist_csv() {
        let input = ExperimentInput::new(1_000, 100, 1_000, 100).unwrap();
        let result = run_z_test(&input, &FrequentistConfig::default()).unwrap();
        let csv = generate_csv_report(&build_frequentist_report(&result));
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "method,variant,visitors,conversions,conversion_rate,uplift,power,z_score,p_value,significant"
        );
        assert_eq!(lines[1], "frequentist,A,1000,100,0.1,,,,,");
        assert!(lines[2].starts_with("frequentist,B,1000,100,0.1,0,"));
        assert!(lines[2].contains(",0,"));
        assert!(lines[2].ends_with(",false"));
        for line in &lines {
            assert_eq!(line.matches(',').count(), 9);
        }
    }
}
