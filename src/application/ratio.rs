//! Percentages and rounding shared by charts and KPIs.
//!
//! Every ratio with an empty denominator is `0.0`.

/// `part / total * 100`, or `0.0` when `total` is zero.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 100.0) / total as f64
}

/// Round to `decimals` places, ties to even.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// One decimal, ties away from zero, with a trailing `%`.
pub fn format_percent_label(value: f64) -> String {
    format!("{:.1}%", (value * 10.0).round() / 10.0)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_denominator_is_zero() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn seventy_thirty_split_is_exact() {
        assert_eq!(round_half_even(percent(7, 10), 2), 70.0);
        assert_eq!(round_half_even(percent(3, 10), 2), 30.0);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_half_even(0.125, 2), 0.12);
        assert_eq!(round_half_even(0.375, 2), 0.38);
    }

    #[test]
    fn label_rounds_away_from_zero() {
        assert_eq!(format_percent_label(12.25), "12.3%");
        assert_eq!(format_percent_label(percent(1, 3)), "33.3%");
        assert_eq!(format_percent_label(0.0), "0.0%");
        assert_eq!(format_percent_label(100.0), "100.0%");
    }
}
