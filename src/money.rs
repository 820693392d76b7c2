//! Money Validation Module
//!
//! Balances and transfer amounts are exact decimals (`rust_decimal::Decimal`),
//! never binary floating point. The ledger stores them with a fixed number of
//! fractional digits (the money scale, `NUMERIC(19, 2)` by default), so every
//! amount entering the system is checked against that scale instead of being
//! rounded on write.
//!
//! ## Usage
//! ```rust
//! use account_ledger::money::{parse_amount, format_amount};
//!
//! let amount = parse_amount("500.00", 2).unwrap();
//! assert_eq!(format_amount(amount, 2), "500.00");
//! assert!(parse_amount("0.001", 2).is_err());
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Fractional digits of the `accounts.balance` column
pub const DEFAULT_SCALE: u32 = 2;

/// Amount validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Fail if `value` needs more than `max_scale` fractional digits.
///
/// Trailing zeros do not count: `500.000` fits scale 2, `0.005` does not.
pub fn check_scale(value: Decimal, max_scale: u32) -> Result<Decimal, AmountError> {
    let provided = value.normalize().scale();
    if provided > max_scale {
        return Err(AmountError::PrecisionOverflow {
            provided,
            max: max_scale,
        });
    }
    Ok(value)
}

/// Validate a transfer amount: strictly positive and representable at `max_scale`.
pub fn validate_amount(amount: Decimal, max_scale: u32) -> Result<Decimal, AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    check_scale(amount, max_scale)
}

/// Parse a client-provided amount string without going through floats.
///
/// Rejects signs, ambiguous forms like `.5` or `5.` and anything with more
/// fractional digits than `max_scale`.
pub fn parse_amount(amount_str: &str, max_scale: u32) -> Result<Decimal, AmountError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(AmountError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(AmountError::NotPositive);
    }

    if let Some((whole, frac)) = amount_str.split_once('.') {
        if whole.is_empty() {
            return Err(AmountError::InvalidFormat(
                "missing leading zero (e.g., use 0.5 instead of .5)".into(),
            ));
        }
        if frac.is_empty() {
            return Err(AmountError::InvalidFormat(
                "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
            ));
        }
    }

    if !amount_str.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(AmountError::InvalidFormat(format!(
            "unexpected characters in '{}'",
            amount_str
        )));
    }

    let amount = Decimal::from_str_exact(amount_str).map_err(|e| match e {
        rust_decimal::Error::ExceedsMaximumPossibleValue => AmountError::Overflow,
        other => AmountError::InvalidFormat(other.to_string()),
    })?;

    validate_amount(amount, max_scale)
}

/// Parse a balance, which unlike a transfer amount may be zero or negative.
pub fn parse_balance(balance_str: &str, max_scale: u32) -> Result<Decimal, AmountError> {
    let balance = Decimal::from_str(balance_str.trim())
        .map_err(|e| AmountError::InvalidFormat(e.to_string()))?;
    check_scale(balance, max_scale)
}

/// Render with exactly `scale` fractional digits.
pub fn format_amount(value: Decimal, scale: u32) -> String {
    let mut value = value;
    value.rescale(scale);
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount_rejects_non_positive() {
        assert_eq!(
            validate_amount(Decimal::ZERO, 2),
            Err(AmountError::NotPositive)
        );
        assert_eq!(validate_amount(dec!(-1.00), 2), Err(AmountError::NotPositive));
        assert_eq!(validate_amount(dec!(0.01), 2), Ok(dec!(0.01)));
    }

    #[test]
    fn test_trailing_zeros_do_not_count() {
        assert_eq!(check_scale(dec!(500.0000), 2), Ok(dec!(500.0000)));
        assert_eq!(
            check_scale(dec!(0.005), 2),
            Err(AmountError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500", 2), Ok(dec!(500)));
        assert_eq!(parse_amount(" 500.00 ", 2), Ok(dec!(500.00)));
        assert_eq!(parse_amount("0.10", 2), Ok(dec!(0.10)));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert_eq!(parse_amount("-5", 2), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("0", 2), Err(AmountError::NotPositive));
        assert!(matches!(
            parse_amount("", 2),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount(".5", 2),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("5.", 2),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("1e3", 2),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("1.005", 2),
            Err(AmountError::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn test_parse_balance_allows_negative() {
        assert_eq!(parse_balance("-20.50", 2), Ok(dec!(-20.50)));
        assert_eq!(parse_balance("0", 2), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(1500), 2), "1500.00");
        assert_eq!(format_amount(dec!(-3.5), 2), "-3.50");
    }
}
