//! Shared radix string codec for the integer types.
//!
//! Grammar: optional leading `+`/`-`, then one or more digits of the
//! requested base (2-36). Letters are case-insensitive on input and
//! lowercase on output.

use softquad_common::{Result, error::Error};

use crate::uint128::UInt128;

pub(crate) const MIN_BASE: u32 = 2;
pub(crate) const MAX_BASE: u32 = 36;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) fn check_base(base: u32) -> Result<()> {
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(Error::invalid_base(base));
    }
    Ok(())
}

/// Parses an optionally signed digit string into a sign flag and the
/// accumulated magnitude.
///
/// The accumulation `value = value * base + digit` runs over wrapping
/// `UInt128` arithmetic, so out-of-range magnitudes wrap silently.
pub(crate) fn parse(text: &str, base: u32) -> Result<(bool, UInt128)> {
    check_base(base)?;
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() {
        return Err(Error::empty_digits());
    }
    let radix = UInt128::from(base);
    let mut value = UInt128::ZERO;
    for ch in digits.chars() {
        let digit = ch
            .to_digit(base)
            .ok_or_else(|| Error::invalid_digit(ch, base))?;
        value = value.wrapping_mul(radix).wrapping_add(UInt128::from(digit));
    }
    Ok((negative, value))
}

/// Formats a magnitude by repeated division by the base, least significant
/// digit first, then reversed. The base must already be validated.
pub(crate) fn format_unsigned(value: UInt128, base: u32) -> String {
    debug_assert!((MIN_BASE..=MAX_BASE).contains(&base));
    if value.is_zero() {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut rest = value;
    while !rest.is_zero() {
        let (quotient, digit) = rest.div_rem_small(base);
        digits.push(DIGITS[digit as usize] as char);
        rest = quotient;
    }
    digits.iter().rev().collect()
}
