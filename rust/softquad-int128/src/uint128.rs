//! The unsigned 128-bit engine.

use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Mul, MulAssign,
    Not, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};
use std::str::FromStr;

use softquad_common::{Result, error::Error};

use crate::radix;

/// An unsigned 128-bit integer stored as four 32-bit limbs, most significant
/// limb first.
///
/// The value is always the literal bit pattern modulo 2^128. Addition,
/// subtraction, and multiplication wrap silently; see [`UInt128::div_rem`]
/// for the only fallible arithmetic.
///
/// The derived ordering compares limbs lexicographically from the most
/// significant limb, which coincides with unsigned numeric order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UInt128 {
    limbs: [u32; 4],
}

impl UInt128 {
    pub const ZERO: UInt128 = UInt128::from_halves(0, 0);
    pub const ONE: UInt128 = UInt128::from_halves(0, 1);
    pub const MIN: UInt128 = UInt128::ZERO;
    pub const MAX: UInt128 = UInt128::from_halves(u64::MAX, u64::MAX);

    /// Assembles a value from its high and low 64-bit halves.
    pub const fn from_halves(hi: u64, lo: u64) -> UInt128 {
        UInt128 {
            limbs: [
                (hi >> 32) as u32,
                hi as u32,
                (lo >> 32) as u32,
                lo as u32,
            ],
        }
    }

    /// The most significant 64 bits.
    pub const fn hi(self) -> u64 {
        ((self.limbs[0] as u64) << 32) | self.limbs[1] as u64
    }

    /// The least significant 64 bits.
    pub const fn lo(self) -> u64 {
        ((self.limbs[2] as u64) << 32) | self.limbs[3] as u64
    }

    pub const fn is_zero(self) -> bool {
        self.limbs[0] == 0 && self.limbs[1] == 0 && self.limbs[2] == 0 && self.limbs[3] == 0
    }

    /// Reads bit `index` (0 = least significant). `index` must be below 128.
    pub fn bit(self, index: u32) -> bool {
        debug_assert!(index < 128);
        (self.limbs[3 - (index / 32) as usize] >> (index % 32)) & 1 == 1
    }

    /// 1-based position of the highest set bit; 0 for the zero value.
    pub fn msb(self) -> u32 {
        for (i, &limb) in self.limbs.iter().enumerate() {
            if limb != 0 {
                return 128 - 32 * i as u32 - limb.leading_zeros();
            }
        }
        0
    }

    /// Limb-wise addition with carry propagation, wrapping modulo 2^128.
    pub fn wrapping_add(self, rhs: UInt128) -> UInt128 {
        let mut limbs = [0u32; 4];
        let mut carry = 0u64;
        for i in (0..4).rev() {
            let sum = self.limbs[i] as u64 + rhs.limbs[i] as u64 + carry;
            limbs[i] = sum as u32;
            carry = sum >> 32;
        }
        UInt128 { limbs }
    }

    /// Limb-wise subtraction with borrow propagation, wrapping modulo 2^128.
    pub fn wrapping_sub(self, rhs: UInt128) -> UInt128 {
        let mut limbs = [0u32; 4];
        let mut borrow = 0u32;
        for i in (0..4).rev() {
            let (d, b1) = self.limbs[i].overflowing_sub(rhs.limbs[i]);
            let (d, b2) = d.overflowing_sub(borrow);
            limbs[i] = d;
            borrow = (b1 || b2) as u32;
        }
        UInt128 { limbs }
    }

    /// Two's-complement negation, wrapping modulo 2^128.
    pub fn wrapping_neg(self) -> UInt128 {
        (!self).wrapping_add(UInt128::ONE)
    }

    /// Schoolbook multiplication: 32x32 -> 64 cross products accumulated
    /// into a 256-bit scratch buffer, truncated to the low 128 bits.
    pub fn wrapping_mul(self, rhs: UInt128) -> UInt128 {
        // Least-significant-first copies keep the index math natural.
        let a = [
            self.limbs[3] as u64,
            self.limbs[2] as u64,
            self.limbs[1] as u64,
            self.limbs[0] as u64,
        ];
        let b = [
            rhs.limbs[3] as u64,
            rhs.limbs[2] as u64,
            rhs.limbs[1] as u64,
            rhs.limbs[0] as u64,
        ];
        let mut prod = [0u32; 8];
        for i in 0..4 {
            let mut carry = 0u64;
            for j in 0..4 {
                let t = prod[i + j] as u64 + a[i] * b[j] + carry;
                prod[i + j] = t as u32;
                carry = t >> 32;
            }
            prod[i + 4] = carry as u32;
        }
        UInt128 {
            limbs: [prod[3], prod[2], prod[1], prod[0]],
        }
    }

    /// Restoring long division.
    ///
    /// Returns `(quotient, remainder)` such that
    /// `self == quotient * divisor + remainder` and `remainder < divisor`.
    ///
    /// Fails with `DivisionByZero` when `divisor` is zero.
    pub fn div_rem(self, divisor: UInt128) -> Result<(UInt128, UInt128)> {
        if divisor.is_zero() {
            return Err(Error::division_by_zero());
        }
        if self < divisor {
            return Ok((UInt128::ZERO, self));
        }
        let mut quotient = UInt128::ZERO;
        let mut remainder = UInt128::ZERO;
        for i in (0..self.msb()).rev() {
            remainder = remainder << 1;
            if self.bit(i) {
                remainder = remainder | UInt128::ONE;
            }
            quotient = quotient << 1;
            if remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient = quotient | UInt128::ONE;
            }
        }
        Ok((quotient, remainder))
    }

    pub fn try_div(self, divisor: UInt128) -> Result<UInt128> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    pub fn try_rem(self, divisor: UInt128) -> Result<UInt128> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Division by a single nonzero limb, used by the radix formatter.
    pub(crate) fn div_rem_small(self, divisor: u32) -> (UInt128, u32) {
        debug_assert!(divisor != 0);
        let mut limbs = [0u32; 4];
        let mut rem = 0u64;
        for i in 0..4 {
            let acc = (rem << 32) | self.limbs[i] as u64;
            limbs[i] = (acc / divisor as u64) as u32;
            rem = acc % divisor as u64;
        }
        (UInt128 { limbs }, rem as u32)
    }

    fn shift_left(self, amount: u32) -> UInt128 {
        if amount >= 128 {
            return UInt128::ZERO;
        }
        let (hi, lo) = (self.hi(), self.lo());
        let (hi, lo) = if amount == 0 {
            (hi, lo)
        } else if amount < 64 {
            ((hi << amount) | (lo >> (64 - amount)), lo << amount)
        } else {
            (lo << (amount - 64), 0)
        };
        UInt128::from_halves(hi, lo)
    }

    fn shift_right(self, amount: u32) -> UInt128 {
        if amount >= 128 {
            return UInt128::ZERO;
        }
        let (hi, lo) = (self.hi(), self.lo());
        let (hi, lo) = if amount == 0 {
            (hi, lo)
        } else if amount < 64 {
            (hi >> amount, (lo >> amount) | (hi << (64 - amount)))
        } else {
            (0, hi >> (amount - 64))
        };
        UInt128::from_halves(hi, lo)
    }

    /// Parses a digit string in the given base (2-36).
    ///
    /// An optional leading `+` or `-` is accepted; a `-` negates the
    /// accumulated magnitude modulo 2^128, consistent with the wrapping
    /// arithmetic everywhere else.
    pub fn from_str_radix(text: &str, base: u32) -> Result<UInt128> {
        let (negative, magnitude) = radix::parse(text, base)?;
        Ok(if negative {
            magnitude.wrapping_neg()
        } else {
            magnitude
        })
    }

    /// Formats the value in the given base (2-36), lowercase digits.
    pub fn to_string_radix(self, base: u32) -> Result<String> {
        radix::check_base(base)?;
        Ok(radix::format_unsigned(self, base))
    }
}

macro_rules! forward_wrapping_binop {
    (impl $imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident => $wrapping:ident for $t:ty) => {
        impl $imp for $t {
            type Output = $t;

            /// Wraps modulo 2^128.
            fn $method(self, rhs: $t) -> $t {
                self.$wrapping(rhs)
            }
        }

        impl $assign_imp for $t {
            fn $assign_method(&mut self, rhs: $t) {
                *self = self.$wrapping(rhs);
            }
        }
    };
}
pub(crate) use forward_wrapping_binop;

forward_wrapping_binop!(impl Add, add, AddAssign, add_assign => wrapping_add for UInt128);
forward_wrapping_binop!(impl Sub, sub, SubAssign, sub_assign => wrapping_sub for UInt128);
forward_wrapping_binop!(impl Mul, mul, MulAssign, mul_assign => wrapping_mul for UInt128);

macro_rules! limbwise_bitop {
    (impl $imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident => $op:tt) => {
        impl $imp for UInt128 {
            type Output = UInt128;

            fn $method(self, rhs: UInt128) -> UInt128 {
                let mut limbs = [0u32; 4];
                for i in 0..4 {
                    limbs[i] = self.limbs[i] $op rhs.limbs[i];
                }
                UInt128 { limbs }
            }
        }

        impl $assign_imp for UInt128 {
            fn $assign_method(&mut self, rhs: UInt128) {
                *self = *self $op rhs;
            }
        }
    };
}

limbwise_bitop!(impl BitAnd, bitand, BitAndAssign, bitand_assign => &);
limbwise_bitop!(impl BitOr, bitor, BitOrAssign, bitor_assign => |);
limbwise_bitop!(impl BitXor, bitxor, BitXorAssign, bitxor_assign => ^);

impl Not for UInt128 {
    type Output = UInt128;

    fn not(self) -> UInt128 {
        UInt128 {
            limbs: [
                !self.limbs[0],
                !self.limbs[1],
                !self.limbs[2],
                !self.limbs[3],
            ],
        }
    }
}

impl Shl<u32> for UInt128 {
    type Output = UInt128;

    /// Logical left shift; amounts of 128 or more yield zero.
    fn shl(self, amount: u32) -> UInt128 {
        self.shift_left(amount)
    }
}

impl Shr<u32> for UInt128 {
    type Output = UInt128;

    /// Logical right shift; amounts of 128 or more yield zero.
    fn shr(self, amount: u32) -> UInt128 {
        self.shift_right(amount)
    }
}

impl ShlAssign<u32> for UInt128 {
    fn shl_assign(&mut self, amount: u32) {
        *self = *self << amount;
    }
}

impl ShrAssign<u32> for UInt128 {
    fn shr_assign(&mut self, amount: u32) {
        *self = *self >> amount;
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        /// Zero-extending conversion; always exact.
        impl From<$t> for UInt128 {
            fn from(value: $t) -> UInt128 {
                UInt128::from_halves(0, value as u64)
            }
        }
    )*};
}

impl_from_unsigned!(u8, u16, u32, u64);

impl From<u128> for UInt128 {
    fn from(value: u128) -> UInt128 {
        UInt128::from_halves((value >> 64) as u64, value as u64)
    }
}

impl From<UInt128> for u128 {
    fn from(value: UInt128) -> u128 {
        ((value.hi() as u128) << 64) | value.lo() as u128
    }
}

impl TryFrom<UInt128> for u64 {
    type Error = Error;

    fn try_from(value: UInt128) -> Result<u64> {
        if value.hi() != 0 {
            return Err(Error::overflow("value does not fit in u64"));
        }
        Ok(value.lo())
    }
}

impl TryFrom<UInt128> for u32 {
    type Error = Error;

    fn try_from(value: UInt128) -> Result<u32> {
        if value.hi() != 0 || value.lo() > u32::MAX as u64 {
            return Err(Error::overflow("value does not fit in u32"));
        }
        Ok(value.lo() as u32)
    }
}

impl FromStr for UInt128 {
    type Err = Error;

    fn from_str(text: &str) -> Result<UInt128> {
        UInt128::from_str_radix(text, 10)
    }
}

impl fmt::Display for UInt128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&radix::format_unsigned(*self, 10))
    }
}

impl fmt::Debug for UInt128 {
    /// Round-trippable form: the hexadecimal digit string annotated with its
    /// base, e.g. `UInt128("7fff", base: 16)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt128(\"{}\", base: 16)", radix::format_unsigned(*self, 16))
    }
}

impl num_traits::Zero for UInt128 {
    fn zero() -> UInt128 {
        UInt128::ZERO
    }

    fn is_zero(&self) -> bool {
        UInt128::is_zero(*self)
    }
}

impl num_traits::One for UInt128 {
    fn one() -> UInt128 {
        UInt128::ONE
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for UInt128 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::de::Deserialize<'de> for UInt128 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<UInt128, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_str(UInt128Visitor)
    }
}

#[cfg(feature = "serde")]
struct UInt128Visitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for UInt128Visitor {
    type Value = UInt128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a decimal UInt128 string")
    }

    fn visit_str<E>(self, s: &str) -> std::result::Result<UInt128, E>
    where
        E: serde::de::Error,
    {
        use serde::de::Unexpected;
        UInt128::from_str(s).map_err(|_| E::invalid_value(Unexpected::Str(s), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(value: u128) -> UInt128 {
        UInt128::from(value)
    }

    #[test]
    fn test_halves_round_trip() {
        let v = UInt128::from_halves(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210);
        assert_eq!(v.hi(), 0x0123_4567_89ab_cdef);
        assert_eq!(v.lo(), 0xfedc_ba98_7654_3210);
    }

    #[test]
    fn test_carry_propagates_across_all_limbs() {
        assert_eq!(u(u64::MAX as u128) + UInt128::ONE, u(1u128 << 64));
        assert_eq!(UInt128::MAX + UInt128::ONE, UInt128::ZERO);
        assert_eq!(UInt128::ZERO - UInt128::ONE, UInt128::MAX);
    }

    #[test]
    fn test_mul_truncates_to_low_128_bits() {
        let big = UInt128::from_halves(1, 0);
        assert_eq!(big * big, UInt128::ZERO);
        assert_eq!(u(3) * u(5), u(15));
        assert_eq!(UInt128::MAX * UInt128::MAX, UInt128::ONE);
    }

    #[test]
    fn test_div_rem_identity() {
        let (q, r) = u(1000).div_rem(u(7)).unwrap();
        assert_eq!((q, r), (u(142), u(6)));
        assert!(u(1).div_rem(UInt128::ZERO).is_err());
        assert_eq!(u(5).div_rem(u(9)).unwrap(), (UInt128::ZERO, u(5)));
    }

    #[test]
    fn test_shifts_cross_limbs() {
        assert_eq!(u(1) << 127, UInt128::from_halves(1 << 63, 0));
        assert_eq!(UInt128::from_halves(1 << 63, 0) >> 127, u(1));
        assert_eq!(u(1) << 128, UInt128::ZERO);
        assert_eq!(UInt128::MAX >> 128, UInt128::ZERO);
    }

    #[test]
    fn test_msb() {
        assert_eq!(UInt128::ZERO.msb(), 0);
        assert_eq!(UInt128::ONE.msb(), 1);
        assert_eq!(u(1u128 << 64).msb(), 65);
        assert_eq!(UInt128::MAX.msb(), 128);
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(UInt128::from_halves(1, 0) > UInt128::from_halves(0, u64::MAX));
        assert!(u(3) < u(4));
        assert_eq!(UInt128::MIN, UInt128::ZERO);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(u64::try_from(u(42)).unwrap(), 42);
        assert!(u64::try_from(UInt128::from_halves(1, 0)).is_err());
        assert!(u32::try_from(u(1u128 << 32)).is_err());
    }
}
