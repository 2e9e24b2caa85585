// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use alloy::primitives::U256;
use alloy::primitives::utils::{format_units, parse_units};

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Integer that may arrive as `0x`-prefixed hex or plain decimal.
pub fn parse_u256_flexible(s: &str) -> Option<U256> {
    let trimmed = s.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        U256::from_str_radix(strip_0x(trimmed), 16).ok()
    } else {
        U256::from_str_radix(trimmed, 10).ok()
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Largest exponent accepted in `1e<n>` notation.
const MAX_EXPONENT: i64 = 128;

/// Rewrite `1.5e-3` as `0.0015` by moving the decimal point in the digit
/// string. Floats would round the last digit.
fn expand_exponent(raw: &str) -> Option<String> {
    let (mantissa, exp) = raw.split_once(['e', 'E'])?;
    let exp: i64 = exp.parse().ok()?;
    if exp.abs() > MAX_EXPONENT {
        return None;
    }
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if !is_digits(whole) || !is_digits(frac) || (whole.is_empty() && frac.is_empty()) {
        return None;
    }
    let digits = format!("{whole}{frac}");
    let point = whole.len() as i64 + exp;
    if point <= 0 {
        Some(format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize)))
    } else if point as usize >= digits.len() {
        Some(format!("{digits}{}", "0".repeat(point as usize - digits.len())))
    } else {
        let (w, f) = digits.split_at(point as usize);
        Some(format!("{w}.{f}"))
    }
}

/// Decimal string to base units, truncating digits beyond `decimals`.
///
/// Accepts exponent notation (`1e-7`) since JSON ledgers written by other
/// tools store share counts as floats.
pub fn parse_decimal_units(raw: &str, decimals: u8) -> Result<U256, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("amount", "empty decimal string"));
    }
    if trimmed.starts_with('-') {
        return Err(AppError::validation(
            "amount",
            format!("negative amount {trimmed}"),
        ));
    }
    let invalid = || AppError::validation("amount", format!("invalid decimal {trimmed}"));

    let expanded;
    let plain = if trimmed.contains(['e', 'E']) {
        expanded = expand_exponent(trimmed).ok_or_else(invalid)?;
        expanded.as_str()
    } else {
        trimmed
    };

    let (whole, frac) = plain.split_once('.').unwrap_or((plain, ""));
    if !is_digits(whole) || !is_digits(frac) || (whole.is_empty() && frac.is_empty()) {
        return Err(invalid());
    }
    // ASCII only past this point, so byte slicing is safe.
    let frac = &frac[..frac.len().min(decimals as usize)];
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    };

    parse_units(&normalized, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| AppError::validation("amount", format!("invalid decimal {trimmed}: {e}")))
}

/// Base units to a trimmed decimal string (`13000000`, 6 -> `13`).
pub fn format_decimal_units(value: U256, decimals: u8) -> String {
    let formatted = format_units(value, decimals).unwrap_or_else(|_| value.to_string());
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flexible_integer_accepts_hex_and_decimal() {
        assert_eq!(parse_u256_flexible("0x2a"), Some(U256::from(42u64)));
        assert_eq!(parse_u256_flexible("0X2A"), Some(U256::from(42u64)));
        assert_eq!(parse_u256_flexible(" 1500 "), Some(U256::from(1500u64)));
        assert_eq!(parse_u256_flexible("1.5"), None);
    }

    #[test]
    fn decimal_units_scale_and_truncate() {
        assert_eq!(
            parse_decimal_units("13", 6).unwrap(),
            U256::from(13_000_000u64)
        );
        assert_eq!(
            parse_decimal_units("0.1234567", 6).unwrap(),
            U256::from(123_456u64)
        );
        assert_eq!(parse_decimal_units("5.", 2).unwrap(), U256::from(500u64));
        assert_eq!(
            parse_decimal_units("1e-3", 6).unwrap(),
            U256::from(1_000u64)
        );
        assert!(parse_decimal_units("-1", 6).is_err());
        assert!(parse_decimal_units("abc", 6).is_err());
        assert!(parse_decimal_units(".", 6).is_err());
        assert_eq!(parse_decimal_units(".5", 1).unwrap(), U256::from(5u64));
    }

    #[test]
    fn exponent_notation_truncates_instead_of_rounding() {
        assert_eq!(parse_decimal_units("9.9999999e-7", 6).unwrap(), U256::ZERO);
        assert_eq!(
            parse_decimal_units("1.2345678E-1", 6).unwrap(),
            U256::from(123_456u64)
        );
        assert_eq!(
            parse_decimal_units("2.5e3", 0).unwrap(),
            U256::from(2_500u64)
        );
        assert_eq!(parse_decimal_units("3e+2", 2).unwrap(), U256::from(30_000u64));
        assert!(parse_decimal_units("1e999", 6).is_err());
        assert!(parse_decimal_units("e5", 6).is_err());
    }

    #[test]
    fn non_ascii_fraction_is_rejected_not_sliced() {
        assert!(parse_decimal_units("1.00000é", 6).is_err());
        assert!(parse_decimal_units("1.é", 1).is_err());
        assert!(parse_decimal_units("１.5", 6).is_err());
    }

    #[test]
    fn formatted_units_drop_trailing_zeros() {
        assert_eq!(format_decimal_units(U256::from(13_000_000u64), 6), "13");
        assert_eq!(format_decimal_units(U256::from(5_200_000u64), 6), "5.2");
        assert_eq!(format_decimal_units(U256::ZERO, 6), "0");
        assert_eq!(format_decimal_units(U256::from(7u64), 0), "7");
    }
}
