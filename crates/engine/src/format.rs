//! Display formatting for USD amounts
//!
//! Formatting is presentation-only: sums and rankings always run on the raw
//! numbers, and these strings are produced last.

/// Abbreviate a USD amount: `$1.25B`, `$3.40M`, `$12.00K`, `$999.00`.
///
/// Missing, NaN and exactly-zero amounts render as `$0`.
pub fn format_currency(amount: Option<f64>) -> String {
    let amount = match amount {
        Some(a) if !a.is_nan() && a != 0.0 => a,
        _ => return "$0".to_string(),
    };

    let magnitude = amount.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("${:.2}B", amount / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("${:.2}M", amount / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("${:.2}K", amount / 1_000.0)
    } else {
        format!("${:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_missing() {
        assert_eq!(format_currency(Some(0.0)), "$0");
        assert_eq!(format_currency(Some(-0.0)), "$0");
        assert_eq!(format_currency(None), "$0");
        assert_eq!(format_currency(Some(f64::NAN)), "$0");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_currency(Some(999.0)), "$999.00");
        assert_eq!(format_currency(Some(1_000.0)), "$1.00K");
        assert_eq!(format_currency(Some(1_000_000.0)), "$1.00M");
        assert_eq!(format_currency(Some(1_000_000_000.0)), "$1.00B");
    }

    #[test]
    fn test_small_and_fractional_amounts() {
        assert_eq!(format_currency(Some(0.5)), "$0.50");
        assert_eq!(format_currency(Some(12.3456)), "$12.35");
        assert_eq!(format_currency(Some(2_500_000_000.0)), "$2.50B");
        assert_eq!(format_currency(Some(45_678.0)), "$45.68K");
    }

    #[test]
    fn test_beyond_billions_stays_in_billions() {
        assert_eq!(format_currency(Some(1_234_000_000_000.0)), "$1234.00B");
    }

    #[test]
    fn test_negative_uses_magnitude_for_unit() {
        assert_eq!(format_currency(Some(-2_000_000.0)), "$-2.00M");
    }

    #[test]
    fn test_same_input_same_output() {
        let a = format_currency(Some(7_654_321.0));
        let b = format_currency(Some(7_654_321.0));
        assert_eq!(a, b);
        assert_eq!(a, "$7.65M");
    }
}
