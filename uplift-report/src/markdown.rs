//! Markdown Output
//!
//! Summary tables suitable for pull requests, wikis, or `$GITHUB_STEP_SUMMARY`.

use crate::report::{Analysis, Report};
use crate::style::{ReportStyle, group_thousands};

/// Generate a Markdown summary of the report
pub fn generate_markdown_report(report: &Report, style: &ReportStyle) -> String {
    let mut md = String::new();

    let title = match report.analysis {
        Analysis::Bayesian(_) => "Bayesian",
        Analysis::Frequentist(_) => "Frequentist",
    };
    md.push_str(&format!("## A/B test result: {}\n\n", title));
    md.push_str(&report.headline(style));
    md.push_str("\n\n");

    match &report.analysis {
        Analysis::Bayesian(b) => {
            md.push_str(
                "| Variant | Visitors | Conversions | Conversion rate | Uplift | Likelihood of being better |\n",
            );
            md.push_str("|---|---:|---:|---:|---:|---:|\n");
            for row in &report.variants {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    row.label,
                    group_thousands(row.visitors),
                    group_thousands(row.conversions),
                    style.percent(row.conversion_rate),
                    uplift_cell(row.label.as_str(), row.uplift, style),
                    style.maybe_percent(row.likelihood_of_being_better),
                ));
            }

            md.push_str("\n### Posterior simulation of the difference\n\n");
            md.push_str(&format!(
                "- Draws per variant: {}\n",
                group_thousands(b.samples as u64)
            ));
            md.push_str(&format!(
                "- Posterior A: Beta({}, {}), B: Beta({}, {})\n",
                b.posterior_a.alpha, b.posterior_a.beta, b.posterior_b.alpha, b.posterior_b.beta
            ));
            md.push_str(&format!(
                "- Mean relative uplift: {}\n",
                style.percent(b.uplift_mean)
            ));
            md.push_str(&format!(
                "- {} credible interval: [{}, {}]\n",
                style.whole_percent(b.credible_level),
                style.percent(b.uplift_ci_lower),
                style.percent(b.uplift_ci_upper)
            ));
        }
        Analysis::Frequentist(f) => {
            md.push_str(
                "| Variant | Visitors | Conversions | Conversion rate | Uplift | Power | Z-score | P-value |\n",
            );
            md.push_str("|---|---:|---:|---:|---:|---:|---:|---:|\n");
            for row in &report.variants {
                let is_variant = row.label == "B";
                let stat = |value: f64| {
                    if is_variant {
                        style.score(value)
                    } else {
                        String::new()
                    }
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                    row.label,
                    group_thousands(row.visitors),
                    group_thousands(row.conversions),
                    style.percent(row.conversion_rate),
                    uplift_cell(row.label.as_str(), row.uplift, style),
                    stat(f.power),
                    stat(f.z_score),
                    stat(f.p_value),
                ));
            }

            md.push_str("\n### Test details\n\n");
            md.push_str(&format!(
                "- Significance level: {} ({}, {} tail)\n",
                style.whole_percent(1.0 - f.alpha),
                f.tails,
                f.tail_direction
            ));
            md.push_str(&format!("- Critical z-value: {}\n", style.score(f.critical_z)));
            md.push_str(&format!(
                "- Type II error: {}\n",
                style.percent(1.0 - f.power)
            ));
            if let Some(mde) = f.minimum_detectable_effect {
                md.push_str(&format!(
                    "- Minimum detectable relative difference: {}\n",
                    style.percent(mde)
                ));
            }
        }
    }

    md
}

fn uplift_cell(label: &str, uplift: Option<f64>, style: &ReportStyle) -> String {
    if label == "A" {
        String::new()
    } else {
        style.maybe_percent(uplift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BayesianReportOptions, build_bayesian_report, build_frequentist_report};
    use uplift_stats::{
        BayesianConfig, ExperimentInput, FrequentistConfig, compute_posterior_seeded, run_z_test,
    };

    fn input() -> ExperimentInput {
        ExperimentInput::new(80_000, 1_600, 80_000, 1_696).unwrap()
    }

    #[test]
    fn test_frequentist_markdown() {
        let result = run_z_test(&input(), &FrequentistConfig::default()).unwrap();
        let md = generate_markdown_report(&build_frequentist_report(&result), &Default::default());

        assert!(md.starts_with("## A/B test result: Frequentist"));
        assert!(md.contains("| A | 80,000 | 1,600 | 2.00% |  |  |  |  |"));
        assert!(md.contains("| B | 80,000 | 1,696 | 2.12% | 6.00% | 0.6663 | 1.6897 | 0.0911 |"));
        assert!(md.contains("- Critical z-value: 1.9600"));
        assert!(md.contains("two-tailed, two tail"));
    }

    #[test]
    fn test_bayesian_markdown() {
        let config = BayesianConfig {
            samples: 5_000,
            ..Default::default()
        };
        let result = compute_posterior_seeded(&input(), &config, 4).unwrap();
        let report = build_bayesian_report(&result, &BayesianReportOptions::default()).unwrap();
        let md = generate_markdown_report(&report, &Default::default());

        assert!(md.starts_with("## A/B test result: Bayesian"));
        assert!(md.contains("Likelihood of being better"));
        assert!(md.contains("- Draws per variant: 5,000"));
        assert!(md.contains("Beta(1601, 78401)"));
        assert!(md.contains("95% credible interval"));
    }
}
