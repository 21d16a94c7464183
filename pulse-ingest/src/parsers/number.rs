//! Lenient numeric fields ("Sale value", "Refunded").

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading-number pattern is valid")
});

/// Parse the longest leading decimal number of `text`; anything unreadable is 0.
///
/// "12.50" → 12.5, "12.50 USD" → 12.5, "" → 0, "$12" → 0
pub fn parse_amount(text: &str) -> f64 {
    LEADING_NUMBER
        .find(text.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_amount("99.00"), 99.0);
        assert_eq!(parse_amount(" 189 "), 189.0);
        assert_eq!(parse_amount("-15.25"), -15.25);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("7."), 7.0);
    }

    #[test]
    fn test_trailing_garbage_is_ignored() {
        assert_eq!(parse_amount("12.50 USD"), 12.5);
        assert_eq!(parse_amount("1e3x"), 1000.0);
    }

    #[test]
    fn test_unreadable_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("$12.00"), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("1e999"), 0.0);
    }
}
