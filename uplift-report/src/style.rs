//! Number formatting shared by every renderer

/// Decimal places used when rendering numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    /// Decimals for percentages (conversion rates, uplift, probabilities)
    pub percent_decimals: usize,
    /// Decimals for test statistics (z-score, p-value, power)
    pub score_decimals: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            percent_decimals: 2,
            score_decimals: 4,
        }
    }
}

impl ReportStyle {
    /// Format a fraction as a percentage, e.g. `0.0312` -> `3.12%`
    pub fn percent(&self, fraction: f64) -> String {
        format!("{:.*}%", self.percent_decimals, fraction * 100.0)
    }

    /// Format a fraction as a whole percentage, e.g. `0.95` -> `95%`
    pub fn whole_percent(&self, fraction: f64) -> String {
        format!("{:.0}%", fraction * 100.0)
    }

    /// Format a test statistic
    pub fn score(&self, value: f64) -> String {
        format!("{:.*}", self.score_decimals, value)
    }

    /// Format an optional percentage, `-` when absent
    pub fn maybe_percent(&self, fraction: Option<f64>) -> String {
        fraction.map_or_else(|| "-".to_string(), |f| self.percent(f))
    }
}

/// Group thousands with commas, e.g. `80000` -> `80,000`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let style = ReportStyle::default();
        assert_eq!(style.percent(0.0312), "3.12%");
        assert_eq!(style.percent(-0.05660377), "-5.66%");
        assert_eq!(style.whole_percent(0.95), "95%");
        assert_eq!(style.maybe_percent(None), "-");

        let precise = ReportStyle {
            percent_decimals: 4,
            ..Default::default()
        };
        assert_eq!(precise.percent(0.5), "50.0000%");
    }

    #[test]
    fn test_score() {
        let style = ReportStyle::default();
        assert_eq!(style.score(1.101638), "1.1016");
        assert_eq!(style.score(-0.5), "-0.5000");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(80_000), "80,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
