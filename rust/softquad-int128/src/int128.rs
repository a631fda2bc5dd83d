//! The two's-complement signed interpretation of the 128-bit limb store.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign};
use std::str::FromStr;

use softquad_common::{Result, error::Error};

use crate::radix;
use crate::uint128::{UInt128, forward_wrapping_binop};

/// Flipping this bit maps two's-complement order onto unsigned order.
const SIGN_FLIP: UInt128 = UInt128::from_halves(1 << 63, 0);

/// A signed 128-bit integer: the same four-limb bit pattern as [`UInt128`],
/// interpreted as two's complement. Sign is bit 127.
///
/// The magnitude range is asymmetric by construction: `MIN` has no positive
/// counterpart, so `-MIN == MIN` and `MIN.abs() == MIN` (documented
/// overflow, not an error). The only fallible arithmetic is division; see
/// [`Int128::div_rem`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Int128 {
    bits: UInt128,
}

impl Int128 {
    pub const ZERO: Int128 = Int128 { bits: UInt128::ZERO };
    pub const ONE: Int128 = Int128 { bits: UInt128::ONE };
    pub const NEG_ONE: Int128 = Int128 {
        bits: UInt128::from_halves(u64::MAX, u64::MAX),
    };
    /// `-2^127`, bit pattern `0x8000...0`.
    pub const MIN: Int128 = Int128 { bits: SIGN_FLIP };
    /// `2^127 - 1`, bit pattern `0x7fff...f`.
    pub const MAX: Int128 = Int128 {
        bits: UInt128::from_halves(0x7fff_ffff_ffff_ffff, u64::MAX),
    };

    /// Reinterprets a raw bit pattern as two's complement.
    pub const fn from_bits(bits: UInt128) -> Int128 {
        Int128 { bits }
    }

    pub const fn to_bits(self) -> UInt128 {
        self.bits
    }

    pub fn is_negative(self) -> bool {
        self.bits.bit(127)
    }

    pub const fn is_zero(self) -> bool {
        self.bits.is_zero()
    }

    /// Two's-complement negation; `-MIN` wraps back to `MIN`.
    pub fn wrapping_neg(self) -> Int128 {
        Int128 {
            bits: self.bits.wrapping_neg(),
        }
    }

    /// Absolute value; `MIN.abs()` wraps back to `MIN`.
    pub fn abs(self) -> Int128 {
        if self.is_negative() {
            self.wrapping_neg()
        } else {
            self
        }
    }

    /// The unsigned magnitude, exact even for `MIN` (which yields `2^127`).
    pub fn unsigned_abs(self) -> UInt128 {
        if self.is_negative() {
            self.bits.wrapping_neg()
        } else {
            self.bits
        }
    }

    pub fn wrapping_add(self, rhs: Int128) -> Int128 {
        Int128 {
            bits: self.bits.wrapping_add(rhs.bits),
        }
    }

    pub fn wrapping_sub(self, rhs: Int128) -> Int128 {
        Int128 {
            bits: self.bits.wrapping_sub(rhs.bits),
        }
    }

    /// Sign/magnitude multiplication: the result sign is the XOR of the
    /// operand signs, the magnitude the wrapping unsigned product.
    /// `MIN * MIN` wraps per 128-bit truncation.
    pub fn wrapping_mul(self, rhs: Int128) -> Int128 {
        let negative = self.is_negative() != rhs.is_negative();
        let magnitude = self.unsigned_abs().wrapping_mul(rhs.unsigned_abs());
        if negative {
            Int128 {
                bits: magnitude.wrapping_neg(),
            }
        } else {
            Int128 { bits: magnitude }
        }
    }

    /// Truncating division, matching native fixed-width semantics.
    ///
    /// The quotient sign is the XOR of the operand signs; the remainder
    /// takes the dividend's sign. Fails with `DivisionByZero` on a zero
    /// divisor and with `Overflow` for `MIN / -1`, the one case whose true
    /// quotient does not fit in 128 bits.
    pub fn div_rem(self, divisor: Int128) -> Result<(Int128, Int128)> {
        if divisor.is_zero() {
            return Err(Error::division_by_zero());
        }
        if self == Int128::MIN && divisor == Int128::NEG_ONE {
            return Err(Error::overflow("Int128::MIN / -1"));
        }
        let (q_mag, r_mag) = self.unsigned_abs().div_rem(divisor.unsigned_abs())?;
        let quotient = if self.is_negative() != divisor.is_negative() {
            Int128 {
                bits: q_mag.wrapping_neg(),
            }
        } else {
            Int128 { bits: q_mag }
        };
        let remainder = if self.is_negative() {
            Int128 {
                bits: r_mag.wrapping_neg(),
            }
        } else {
            Int128 { bits: r_mag }
        };
        Ok((quotient, remainder))
    }

    pub fn try_div(self, divisor: Int128) -> Result<Int128> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    pub fn try_rem(self, divisor: Int128) -> Result<Int128> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Parses an optionally signed digit string in the given base (2-36).
    /// Out-of-range magnitudes wrap silently modulo 2^128.
    pub fn from_str_radix(text: &str, base: u32) -> Result<Int128> {
        let (negative, magnitude) = radix::parse(text, base)?;
        Ok(Int128 {
            bits: if negative {
                magnitude.wrapping_neg()
            } else {
                magnitude
            },
        })
    }

    /// Formats the value in the given base (2-36): a `-` for negatives, then
    /// the magnitude in lowercase digits.
    pub fn to_string_radix(self, base: u32) -> Result<String> {
        radix::check_base(base)?;
        let digits = radix::format_unsigned(self.unsigned_abs(), base);
        Ok(if self.is_negative() {
            format!("-{digits}")
        } else {
            digits
        })
    }
}

impl Ord for Int128 {
    fn cmp(&self, other: &Int128) -> Ordering {
        (self.bits ^ SIGN_FLIP).cmp(&(other.bits ^ SIGN_FLIP))
    }
}

impl PartialOrd for Int128 {
    fn partial_cmp(&self, other: &Int128) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

forward_wrapping_binop!(impl Add, add, AddAssign, add_assign => wrapping_add for Int128);
forward_wrapping_binop!(impl Sub, sub, SubAssign, sub_assign => wrapping_sub for Int128);
forward_wrapping_binop!(impl Mul, mul, MulAssign, mul_assign => wrapping_mul for Int128);

impl Neg for Int128 {
    type Output = Int128;

    /// Wrapping negation; `-MIN == MIN`.
    fn neg(self) -> Int128 {
        self.wrapping_neg()
    }
}

impl Shl<u32> for Int128 {
    type Output = Int128;

    /// Plain logical shift on the raw bits: `Int128::NEG_ONE << 1 == -2`.
    fn shl(self, amount: u32) -> Int128 {
        Int128 {
            bits: self.bits << amount,
        }
    }
}

impl Shr<u32> for Int128 {
    type Output = Int128;

    /// Arithmetic (sign-extending) shift: `Int128::from(-2) >> 1 == -1`.
    /// Amounts of 128 or more saturate to the sign fill (0 or -1).
    fn shr(self, amount: u32) -> Int128 {
        if self.is_negative() {
            Int128 {
                bits: !((!self.bits) >> amount),
            }
        } else {
            Int128 {
                bits: self.bits >> amount,
            }
        }
    }
}

impl ShlAssign<u32> for Int128 {
    fn shl_assign(&mut self, amount: u32) {
        *self = *self << amount;
    }
}

impl ShrAssign<u32> for Int128 {
    fn shr_assign(&mut self, amount: u32) {
        *self = *self >> amount;
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        /// Sign-extending conversion; always exact.
        impl From<$t> for Int128 {
            fn from(value: $t) -> Int128 {
                Int128::from_bits(UInt128::from(value as i128 as u128))
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64, i128);

impl From<Int128> for i128 {
    fn from(value: Int128) -> i128 {
        u128::from(value.bits) as i128
    }
}

impl TryFrom<Int128> for i64 {
    type Error = Error;

    fn try_from(value: Int128) -> Result<i64> {
        i64::try_from(i128::from(value)).map_err(|_| Error::overflow("value does not fit in i64"))
    }
}

impl TryFrom<Int128> for i32 {
    type Error = Error;

    fn try_from(value: Int128) -> Result<i32> {
        i32::try_from(i128::from(value)).map_err(|_| Error::overflow("value does not fit in i32"))
    }
}

impl FromStr for Int128 {
    type Err = Error;

    fn from_str(text: &str) -> Result<Int128> {
        Int128::from_str_radix(text, 10)
    }
}

impl fmt::Display for Int128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", radix::format_unsigned(self.unsigned_abs(), 10))
        } else {
            f.write_str(&radix::format_unsigned(self.bits, 10))
        }
    }
}

impl fmt::Debug for Int128 {
    /// Round-trippable form: signed hexadecimal magnitude annotated with its
    /// base, e.g. `Int128("-80000000000000000000000000000000", base: 16)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "Int128(\"{sign}{}\", base: 16)",
            radix::format_unsigned(self.unsigned_abs(), 16)
        )
    }
}

impl num_traits::Zero for Int128 {
    fn zero() -> Int128 {
        Int128::ZERO
    }

    fn is_zero(&self) -> bool {
        Int128::is_zero(*self)
    }
}

impl num_traits::One for Int128 {
    fn one() -> Int128 {
        Int128::ONE
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for Int128 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::de::Deserialize<'de> for Int128 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Int128, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_str(Int128Visitor)
    }
}

#[cfg(feature = "serde")]
struct Int128Visitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for Int128Visitor {
    type Value = Int128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a decimal Int128 string")
    }

    fn visit_str<E>(self, s: &str) -> std::result::Result<Int128, E>
    where
        E: serde::de::Error,
    {
        use serde::de::Unexpected;
        Int128::from_str(s).map_err(|_| E::invalid_value(Unexpected::Str(s), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(value: i128) -> Int128 {
        Int128::from(value)
    }

    #[test]
    fn test_sign_and_ordering() {
        assert!(i(-1).is_negative());
        assert!(!i(0).is_negative());
        assert!(Int128::MIN < Int128::NEG_ONE);
        assert!(Int128::NEG_ONE < Int128::ZERO);
        assert!(Int128::ZERO < Int128::MAX);
        assert!(i(-5) < i(3));
    }

    #[test]
    fn test_negation_wraps_at_min() {
        assert_eq!(-i(5), i(-5));
        assert_eq!(-Int128::MIN, Int128::MIN);
        assert_eq!(Int128::MIN.abs(), Int128::MIN);
        assert_eq!(
            Int128::MIN.unsigned_abs(),
            UInt128::from_halves(1 << 63, 0)
        );
    }

    #[test]
    fn test_wrapping_boundaries() {
        assert_eq!(Int128::MAX + Int128::ONE, Int128::MIN);
        assert_eq!(Int128::MIN + Int128::MAX, Int128::NEG_ONE);
        assert_eq!(Int128::MIN * Int128::MIN, Int128::ZERO);
    }

    #[test]
    fn test_div_rem_truncates_toward_zero() {
        let check = |a: i128, b: i128| {
            let (q, r) = i(a).div_rem(i(b)).unwrap();
            assert_eq!((i128::from(q), i128::from(r)), (a / b, a % b), "{a} / {b}");
        };
        check(7, 2);
        check(-7, 2);
        check(7, -2);
        check(-7, -2);
    }

    #[test]
    fn test_div_errors() {
        assert!(i(1).div_rem(Int128::ZERO).is_err());
        assert!(Int128::MIN.div_rem(Int128::NEG_ONE).is_err());
        assert_eq!(
            Int128::MIN.div_rem(Int128::ONE).unwrap().0,
            Int128::MIN
        );
    }

    #[test]
    fn test_shifts() {
        assert_eq!(i(-1) << 1, i(-2));
        assert_eq!(i(-2) >> 1, i(-1));
        assert_eq!(i(4) >> 1, i(2));
        assert_eq!(i(-1) >> 200, i(-1));
        assert_eq!(i(1) >> 200, i(0));
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(i64::try_from(i(-42)).unwrap(), -42);
        assert!(i64::try_from(Int128::MIN).is_err());
        assert!(i32::try_from(i(1i128 << 40)).is_err());
    }
}
