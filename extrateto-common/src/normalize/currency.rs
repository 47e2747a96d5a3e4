//! Currency value parser
//!
//! Upstream values arrive in one of three shapes:
//! - Brazilian locale decimal: `"33.924,92"` (`.` thousands, `,` decimal)
//! - bare integer of cents: `"3392492"` means 33924.92
//! - occasionally a plain `"."`-decimal: `"123.45"`
//!
//! A digits-only string is always cents, never whole reais. Anything else
//! is read up to its longest leading numeric prefix, so `"12,ab"` is 12 and
//! `"1.234.567"` is 1.234.

use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER_CENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").expect("Invalid cents regex"));
static NUMERIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("Invalid prefix regex"));

/// Result of parsing one raw value, kept distinct so fallbacks stay observable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValorParse {
    /// Empty field or the literal zero
    Empty,
    /// Successfully parsed amount
    Parsed(f64),
    /// Amount read from a numeric prefix; trailing text was ignored
    Truncated(f64),
    /// Could not be parsed; counts as zero
    Unparseable,
}

impl ValorParse {
    /// Amount contributed to totals (zero unless parsed)
    pub fn value(&self) -> f64 {
        match self {
            ValorParse::Parsed(v) | ValorParse::Truncated(v) => *v,
            ValorParse::Empty | ValorParse::Unparseable => 0.0,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, ValorParse::Unparseable)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, ValorParse::Truncated(_))
    }
}

/// Parse a raw value keeping track of how it was interpreted
pub fn classify_valor(raw: &str) -> ValorParse {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return ValorParse::Empty;
    }

    if trimmed.contains(',') {
        let cleaned = trimmed.replace('.', "").replacen(',', ".", 1);
        return parse_float(&cleaned);
    }

    if INTEGER_CENTS.is_match(trimmed) {
        // Digit strings too long for i64 still parse exactly enough as f64
        return match trimmed.parse::<i64>() {
            Ok(cents) => ValorParse::Parsed(cents as f64 / 100.0),
            Err(_) => match trimmed.parse::<f64>() {
                Ok(cents) => ValorParse::Parsed(cents / 100.0),
                Err(_) => ValorParse::Unparseable,
            },
        };
    }

    parse_float(trimmed)
}

/// Parse a raw value, defaulting to 0 on anything unparseable
pub fn parse_valor(raw: &str) -> f64 {
    classify_valor(raw).value()
}

/// Longest leading decimal number of `s`; 0 when there is none
fn parse_float(s: &str) -> ValorParse {
    let Some(prefix) = NUMERIC_PREFIX.find(s) else {
        return ValorParse::Unparseable;
    };
    match prefix.as_str().parse::<f64>() {
        Ok(v) if v.is_finite() && prefix.end() == s.len() => ValorParse::Parsed(v),
        Ok(v) if v.is_finite() => ValorParse::Truncated(v),
        _ => ValorParse::Unparseable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brazilian_format() {
        assert_eq!(parse_valor("33.924,92"), 33924.92);
        assert_eq!(parse_valor("33924,92"), 33924.92);
        assert_eq!(parse_valor("1.234.567,89"), 1234567.89);
        assert_eq!(parse_valor("30.000,00"), 30000.0);
    }

    #[test]
    fn test_digits_only_are_cents() {
        assert_eq!(parse_valor("3392492"), 33924.92);
        assert_eq!(parse_valor("100"), 1.0);
        assert_eq!(parse_valor("-2500"), -25.0);
    }

    #[test]
    fn test_dot_decimal_fallback() {
        assert_eq!(parse_valor("123.45"), 123.45);
    }

    #[test]
    fn test_zero_empty_and_garbage() {
        assert_eq!(parse_valor("0"), 0.0);
        assert_eq!(parse_valor(""), 0.0);
        assert_eq!(parse_valor("   "), 0.0);
        assert_eq!(parse_valor("abc"), 0.0);
        assert_eq!(parse_valor("-"), 0.0);
    }

    #[test]
    fn test_numeric_prefix_is_kept() {
        assert_eq!(parse_valor("12,ab"), 12.0);
        assert_eq!(parse_valor("1.234.567"), 1.234);
        assert_eq!(parse_valor("45.5 reais"), 45.5);
        assert_eq!(parse_valor(".5x"), 0.5);
        assert_eq!(parse_valor("1e3kg"), 1000.0);
        assert_eq!(classify_valor("1.234.567"), ValorParse::Truncated(1.234));
        assert_eq!(classify_valor("12,ab"), ValorParse::Truncated(12.0));
        assert_eq!(classify_valor("123.45"), ValorParse::Parsed(123.45));
    }

    #[test]
    fn test_classification_distinguishes_fallbacks() {
        assert_eq!(classify_valor(""), ValorParse::Empty);
        assert_eq!(classify_valor("0"), ValorParse::Empty);
        assert_eq!(classify_valor("abc"), ValorParse::Unparseable);
        assert_eq!(classify_valor("NaN"), ValorParse::Unparseable);
        assert_eq!(classify_valor(" 5,50 "), ValorParse::Parsed(5.5));
    }
}
