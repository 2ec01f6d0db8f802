//! Exact money handling. Amounts are integer cents end to end; decimal text
//! only exists at the form boundary (parsing) and the template boundary
//! (formatting).

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ServiceError;

/// Parses a price typed by a user into cents.
///
/// Accepts both decimal-comma input ("1.234,56", "79,90") and decimal-dot
/// input ("1234.56", "79.9"). When a comma is present, dots are treated as
/// thousands separators. Unparsable or negative input is rejected; it is
/// never silently coerced to zero.
pub fn parse_price(input: &str) -> Result<i64, ServiceError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(ServiceError::InvalidInput("price is required".to_string()));
    }

    let normalized = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.to_string()
    };

    let amount = Decimal::from_str(&normalized)
        .map_err(|_| ServiceError::InvalidInput(format!("'{}' is not a valid price", raw)))?;

    if amount.is_sign_negative() {
        return Err(ServiceError::InvalidInput(format!(
            "price must not be negative: '{}'",
            raw
        )));
    }

    let cents = (amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| ServiceError::InvalidInput(format!("price out of range: '{}'", raw)))?;

    Ok(cents)
}

/// Parses an optional cost field. Blank means unknown, anything else must be
/// a valid non-negative amount.
pub fn parse_optional_cost(input: &str) -> Result<Option<i64>, ServiceError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_price(input).map(Some)
}

/// Formats cents as Brazilian currency text, e.g. 123456 -> "R$ 1.234,56".
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {}{},{:02}", sign, grouped, centavos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_dot() {
        assert_eq!(parse_price("79.90").unwrap(), 7990);
        assert_eq!(parse_price("79.9").unwrap(), 7990);
        assert_eq!(parse_price("1234.56").unwrap(), 123456);
        assert_eq!(parse_price("40").unwrap(), 4000);
    }

    #[test]
    fn parses_decimal_comma_with_thousands() {
        assert_eq!(parse_price("79,90").unwrap(), 7990);
        assert_eq!(parse_price("1.234,56").unwrap(), 123456);
        assert_eq!(parse_price("1.234.567,89").unwrap(), 123456789);
    }

    #[test]
    fn rejects_garbage_instead_of_defaulting_to_zero() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("12,34,56").is_err());
    }

    #[test]
    fn rejects_negative() {
        assert!(parse_price("-5").is_err());
        assert!(parse_price("-0,01").is_err());
    }

    #[test]
    fn optional_cost_blank_is_unknown() {
        assert_eq!(parse_optional_cost("").unwrap(), None);
        assert_eq!(parse_optional_cost("   ").unwrap(), None);
        assert_eq!(parse_optional_cost("5.00").unwrap(), Some(500));
        assert!(parse_optional_cost("n/a").is_err());
    }

    #[test]
    fn formats_brl() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(7990), "R$ 79,90");
        assert_eq!(format_brl(123456), "R$ 1.234,56");
        assert_eq!(format_brl(123456789), "R$ 1.234.567,89");
        assert_eq!(format_brl(-7990), "R$ -79,90");
    }
}
