use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary value half-up to 2 fraction digits.
///
/// Every arithmetic step in the allocation engine re-quantizes through this
/// function so that repeated partial subtractions cannot drift.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a locale-formatted amount string.
///
/// Accepts currency symbols, spaces, and either `,` or `.` as thousands
/// separator. When both appear, whichever comes last is the decimal
/// separator (`"1.234,56"` and `"1,234.56"` both parse to `1234.56`).
/// A lone comma followed by at most two digits is read as a decimal comma
/// (`"100,00"` -> `100.00`); otherwise commas are thousands separators.
///
/// Returns `None` for empty, `"null"`, or unparsable input.
pub fn parse(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        return None;
    }
    let mut s: String = s.replace(['$', ' '], "");

    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => {
            s = s.replace('.', "").replace(',', ".");
        }
        (Some(_), Some(_)) => {
            s = s.replace(',', "");
        }
        (None, Some(comma)) => {
            let fraction_digits = s.len() - comma - 1;
            if s.matches(',').count() == 1 && fraction_digits <= 2 {
                s = s.replace(',', ".");
            } else {
                s = s.replace(',', "");
            }
        }
        _ => {}
    }

    s.parse::<Decimal>().ok().map(quantize)
}

/// Normalizes an optional raw amount to a quantized decimal.
///
/// Missing or unparsable values normalize to `0.00`; callers that need to
/// distinguish "no value" from a genuine zero must check before calling.
pub fn normalize(raw: Option<&str>) -> Decimal {
    raw.and_then(parse).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_currency_symbol_and_thousands() {
        assert_eq!(parse("$2,275.00"), Some(dec!(2275.00)));
        assert_eq!(parse("$ 1,000"), Some(dec!(1000)));
    }

    #[test]
    fn test_parse_latin_american_format() {
        assert_eq!(parse("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse("100,00"), Some(dec!(100.00)));
        assert_eq!(parse("1,234"), Some(dec!(1234)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("null"), None);
        assert_eq!(parse("abc"), None);
    }

    #[test]
    fn test_normalize_missing_is_zero() {
        assert_eq!(normalize(None), Decimal::ZERO);
        assert_eq!(normalize(Some("")), Decimal::ZERO);
        assert_eq!(normalize(Some("not a number")), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["$2,275.00", "1.234,56", "0.005", "-12.5", "99"] {
            let once = normalize(Some(raw));
            let twice = normalize(Some(&once.to_string()));
            assert_eq!(once, twice, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_quantize_half_up() {
        assert_eq!(quantize(dec!(1.005)), dec!(1.01));
        assert_eq!(quantize(dec!(1.004)), dec!(1.00));
        assert_eq!(quantize(dec!(-1.005)), dec!(-1.01));
    }
}
