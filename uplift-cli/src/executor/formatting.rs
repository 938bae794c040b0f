//! Output Formatting
//!
//! Human-readable output formatting for analysis reports.
//!
//! Generates terminal-friendly output with:
//! - A per-variant table (visitors, conversions, rate, uplift)
//! - The headline conclusion
//! - Method details: posteriors and uplift histogram, or test statistics

use uplift_report::{
    Analysis, BayesianSummary, FrequentistSummary, Histogram, Report, ReportStyle,
    group_thousands,
};

/// Widest histogram bar, in characters
const BAR_WIDTH: usize = 40;

/// Histogram rows shown on each side of zero
const MAX_HISTOGRAM_ROWS: usize = 12;

/// Format a report for human-readable terminal display
///
/// # Arguments
/// * `report` - Complete analysis report
/// * `style` - Decimal places for percentages and statistics
///
/// # Returns
/// Formatted string suitable for terminal output
pub fn format_human_output(report: &Report, style: &ReportStyle) -> String {
    let mut output = String::new();

    output.push('\n');
    let title = match report.analysis {
        Analysis::Bayesian(_) => "Uplift Results (Bayesian)",
        Analysis::Frequentist(_) => "Uplift Results (Frequentist)",
    };
    output.push_str(title);
    output.push('\n');
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    // Variant table
    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10}",
        "Variant", "Visitors", "Conversions", "Rate", "Uplift"
    ));
    if matches!(report.analysis, Analysis::Bayesian(_)) {
        output.push_str(&format!(" {:>12}", "P(better)"));
    }
    output.push('\n');
    output.push_str(&format!("  {}\n", "-".repeat(58)));

    for row in &report.variants {
        let uplift = if row.label == "A" {
            String::new()
        } else {
            style.maybe_percent(row.uplift)
        };
        output.push_str(&format!(
            "  {:<8} {:>12} {:>12} {:>10} {:>10}",
            row.label,
            group_thousands(row.visitors),
            group_thousands(row.conversions),
            style.percent(row.conversion_rate),
            uplift
        ));
        if let Some(likelihood) = row.likelihood_of_being_better {
            output.push_str(&format!(" {:>12}", style.percent(likelihood)));
        }
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&report.headline(style));
    output.push_str("\n\n");

    match &report.analysis {
        Analysis::Bayesian(b) => push_bayesian_details(&mut output, b, style),
        Analysis::Frequentist(f) => push_frequentist_details(&mut output, f, style),
    }

    output
}

fn push_bayesian_details(output: &mut String, b: &BayesianSummary, style: &ReportStyle) {
    output.push_str("Posterior\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  A: Beta({}, {})  mean {}\n",
        b.posterior_a.alpha,
        b.posterior_a.beta,
        style.percent(b.posterior_a.mean)
    ));
    output.push_str(&format!(
        "  B: Beta({}, {})  mean {}\n",
        b.posterior_b.alpha,
        b.posterior_b.beta,
        style.percent(b.posterior_b.mean)
    ));
    output.push_str(&format!(
        "  draws: {} per variant\n",
        group_thousands(b.samples as u64)
    ));
    output.push_str(&format!(
        "  relative uplift: mean {}  {} CI [{}, {}]\n",
        style.percent(b.uplift_mean),
        style.whole_percent(b.credible_level),
        style.percent(b.uplift_ci_lower),
        style.percent(b.uplift_ci_upper)
    ));

    if !b.histogram.losses.is_empty() || !b.histogram.gains.is_empty() {
        output.push_str("\nRelative uplift distribution\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        push_histogram(output, &b.histogram, style);
    }
}

fn push_histogram(output: &mut String, histogram: &Histogram, style: &ReportStyle) {
    let peak = histogram
        .losses
        .iter()
        .chain(&histogram.gains)
        .map(|bin| bin.fraction)
        .fold(0.0_f64, f64::max);
    if peak <= 0.0 {
        return;
    }

    // Closest bins to zero carry the interesting shape; trim the far tails
    let losses = &histogram.losses[histogram.losses.len().saturating_sub(MAX_HISTOGRAM_ROWS)..];
    let gains = &histogram.gains[..histogram.gains.len().min(MAX_HISTOGRAM_ROWS)];

    for (marker, bins) in [("-", losses), ("+", gains)] {
        for bin in bins {
            if bin.fraction == 0.0 {
                continue;
            }
            let width = ((bin.fraction / peak) * BAR_WIDTH as f64).round() as usize;
            output.push_str(&format!(
                "  {} [{:>8}, {:>8})  {:<bar$} {}\n",
                marker,
                style.percent(bin.lower),
                style.percent(bin.upper),
                "#".repeat(width.max(1)),
                style.percent(bin.fraction),
                bar = BAR_WIDTH
            ));
        }
    }
}

fn push_frequentist_details(output: &mut String, f: &FrequentistSummary, style: &ReportStyle) {
    output.push_str("Test statistics\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  confidence: {}  ({}, {} tail)\n",
        style.whole_percent(1.0 - f.alpha),
        f.tails,
        f.tail_direction
    ));
    output.push_str(&format!(
        "  z-score: {}  p-value: {}  power: {}\n",
        style.score(f.z_score),
        style.score(f.p_value),
        style.score(f.power)
    ));
    output.push_str(&format!(
        "  critical z: {}  type II error: {}\n",
        style.score(f.critical_z),
        style.percent(1.0 - f.power)
    ));
    output.push_str(&format!(
        "  standard error: A {}  B {}  difference {}\n",
        style.score(f.control_se),
        style.score(f.variant_se),
        style.score(f.se_difference)
    ));
    if let Some(mde) = f.minimum_detectable_effect {
        output.push_str(&format!(
            "  minimum detectable relative difference: {}\n",
            style.percent(mde)
        ));
    }
    let icon = if f.significant { "✓" } else { "✗" };
    output.push_str(&format!(
        "\n  {} {}\n",
        icon,
        if f.significant {
            "significant"
        } else {
            "not significant"
        }
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplift_report::{BayesianReportOptions, build_bayesian_report, build_frequentist_report};
    use uplift_stats::{
        BayesianConfig, ExperimentInput, FrequentistConfig, TailMode, compute_posterior_seeded,
        run_z_test,
    };

    #[test]
    fn test_frequentist_output() {
        let input = ExperimentInput::new(80_000, 1_600, 80_000, 1_696).unwrap();
        let config = FrequentistConfig {
            alpha: 0.05,
            tails: TailMode::One,
        };
        let report = build_frequentist_report(&run_z_test(&input, &config).unwrap());
        let output = format_human_output(&report, &ReportStyle::default());

        assert!(output.contains("Uplift Results (Frequentist)"));
        assert!(output.contains("80,000"));
        assert!(output.contains("6.00%"));
        assert!(output.contains("Significant: B's conversion rate is 6.00% higher"));
        assert!(output.contains("✓ significant"));
        assert!(!output.contains("P(better)"));
    }

    #[test]
    fn test_bayesian_output() {
        let input = ExperimentInput::new(1_000, 100, 1_000, 120).unwrap();
        let config = BayesianConfig {
            samples: 4_000,
            parallel: false,
        };
        let result = compute_posterior_seeded(&input, &config, 5).unwrap();
        let report = build_bayesian_report(&result, &BayesianReportOptions::default()).unwrap();
        let output = format_human_output(&report, &ReportStyle::default());

        assert!(output.contains("Uplift Results (Bayesian)"));
        assert!(output.contains("P(better)"));
        assert!(output.contains("Beta(101, 901)"));
        assert!(output.contains("Relative uplift distribution"));
        assert!(output.contains('#'));
    }
}
