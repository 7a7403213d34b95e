//! Conversion between base units and human-readable decimal amounts.
//!
//! EVM balances are integers in the token's smallest unit. The conventional
//! representation divides by `10^decimals`: 18 for ether, other values for
//! some tokens and chains.

use alloy_primitives::U256;
use thiserror::Error;

/// Largest decimals value whose scale factor fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// Decimals used by ether and most EVM-native tokens.
pub const ETHER_DECIMALS: u8 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Amount {amount:?} has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },
    #[error("Amount overflows 256 bits: {0:?}")]
    Overflow(String),
    #[error("Unsupported decimals: {0} (max {MAX_DECIMALS})")]
    TooManyDecimals(u8),
}

fn scale(decimals: u8) -> Result<U256, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::TooManyDecimals(decimals));
    }
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(UnitsError::TooManyDecimals(decimals))
}

/// Formats a base-unit amount as a decimal string with trailing zeros removed.
///
/// `format_units(10^18, 18)` is `"1"`, `format_units(10^15, 18)` is `"0.001"`.
pub fn format_units(value: U256, decimals: u8) -> Result<String, UnitsError> {
    let base = scale(decimals)?;
    let whole = value / base;
    let fraction = value % base;

    if fraction.is_zero() {
        return Ok(whole.to_string());
    }

    let digits = format!(
        "{:0>width$}",
        fraction.to_string(),
        width = usize::from(decimals)
    );
    Ok(format!("{whole}.{}", digits.trim_end_matches('0')))
}

/// Parses a decimal amount such as `"0.001"` into base units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let base = scale(decimals)?;
    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(amount.to_string());
    let whole_value = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| overflow())?
    };

    let padded = format!("{fraction:0<width$}", width = usize::from(decimals));
    let fraction_value = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    whole_value
        .checked_mul(base)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u8).pow(U256::from(18u8))
    }

    #[test]
    fn test_format_one_ether() {
        assert_eq!(format_units(ether(1), ETHER_DECIMALS).unwrap(), "1");
    }

    #[test]
    fn test_format_fractional_amount() {
        let value = U256::from(1_000_000_000_000_000u64);
        assert_eq!(format_units(value, ETHER_DECIMALS).unwrap(), "0.001");

        let value = ether(2) + U256::from(500_000_000_000_000_000u64);
        assert_eq!(format_units(value, ETHER_DECIMALS).unwrap(), "2.5");
    }

    #[test]
    fn test_format_zero_and_dust() {
        assert_eq!(format_units(U256::ZERO, ETHER_DECIMALS).unwrap(), "0");
        assert_eq!(
            format_units(U256::from(1u8), ETHER_DECIMALS).unwrap(),
            "0.000000000000000001"
        );
    }

    #[test]
    fn test_format_other_decimals() {
        assert_eq!(format_units(U256::from(1_234_567u64), 6).unwrap(), "1.234567");
        assert_eq!(format_units(U256::from(42u8), 0).unwrap(), "42");
    }

    #[test]
    fn test_format_rejects_unsupported_decimals() {
        assert_eq!(
            format_units(U256::from(1u8), 78),
            Err(UnitsError::TooManyDecimals(78))
        );
        assert!(format_units(U256::MAX, MAX_DECIMALS).is_ok());
    }

    #[test]
    fn test_parse_demo_transfer_amount() {
        assert_eq!(
            parse_units("0.001", ETHER_DECIMALS).unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_whole_and_partial_forms() {
        assert_eq!(parse_units("1", ETHER_DECIMALS).unwrap(), ether(1));
        assert_eq!(parse_units("1.", ETHER_DECIMALS).unwrap(), ether(1));
        assert_eq!(
            parse_units(".5", ETHER_DECIMALS).unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
        assert_eq!(parse_units(" 3 ", 0).unwrap(), U256::from(3u8));
    }

    #[test]
    fn test_parse_invalid_amounts() {
        for input in ["", ".", "abc", "1.2.3", "-1", "1e18", "0x10"] {
            assert!(
                matches!(
                    parse_units(input, ETHER_DECIMALS),
                    Err(UnitsError::InvalidAmount(_))
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_too_precise() {
        let err = parse_units("0.1234567", 6).unwrap_err();
        assert!(matches!(err, UnitsError::TooPrecise { decimals: 6, .. }));
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "1".repeat(80);
        assert!(matches!(
            parse_units(&huge, ETHER_DECIMALS),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_parse_agree_on_balance() {
        let value = U256::from(123_456_789_000_000_000_000u128);
        let formatted = format_units(value, ETHER_DECIMALS).unwrap();
        assert_eq!(formatted, "123.456789");
        assert_eq!(parse_units(&formatted, ETHER_DECIMALS).unwrap(), value);
    }
}
