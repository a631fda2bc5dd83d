//! The binary128 bit layout: packing, classification, and `f64` bridging.

use std::cmp::Ordering;
use std::fmt;

use softquad_int128::UInt128;

use crate::hostmath;

pub(crate) const SIGN_MASK: UInt128 = UInt128::from_halves(0x8000_0000_0000_0000, 0);
pub(crate) const EXP_MASK: UInt128 = UInt128::from_halves(0x7fff_0000_0000_0000, 0);
pub(crate) const MANT_MASK: UInt128 =
    UInt128::from_halves(0x0000_ffff_ffff_ffff, 0xffff_ffff_ffff_ffff);
/// The implicit leading 1 of a normal significand, bit 112.
pub(crate) const IMPLICIT_BIT: UInt128 = UInt128::from_halves(0x0001_0000_0000_0000, 0);

/// Exponent bias of the 15-bit exponent field.
pub const EXP_BIAS: i32 = 16383;

const EXP_SPECIAL: i32 = 0x7fff;
const MANT_BITS: u32 = 112;

/// Classification of a [`Float128`] bit pattern.
///
/// Produced by [`Float128::classify`] and consumed by comparison,
/// formatting, and the arithmetic special-case handling. Subnormal patterns
/// are not distinguished; they classify as `Normal`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FpClass {
    Zero,
    Normal,
    Infinite,
    Nan,
}

/// A quadruple-precision (binary128) floating point value, stored as a raw
/// 128-bit pattern: sign(1) | exponent(15, bias 16383) | mantissa(112,
/// implicit leading 1 for normals).
///
/// Values are immutable; every operation produces a new value. Multiply,
/// add, and subtract are total (NaN for invalid combinations); division and
/// modulo report `DivisionByZero` through [`Float128::try_div`] and
/// [`Float128::try_rem`].
#[derive(Clone, Copy)]
pub struct Float128 {
    pub(crate) bits: UInt128,
}

impl Float128 {
    /// Canonical positive zero: all bits clear.
    pub const ZERO: Float128 = Float128 { bits: UInt128::ZERO };
    pub const NEG_ZERO: Float128 = Float128 { bits: SIGN_MASK };
    pub const ONE: Float128 = Float128 {
        bits: UInt128::from_halves(0x3fff_0000_0000_0000, 0),
    };
    pub const INFINITY: Float128 = Float128 { bits: EXP_MASK };
    pub const NEG_INFINITY: Float128 = Float128 {
        bits: UInt128::from_halves(0xffff_0000_0000_0000, 0),
    };
    /// The canonical quiet NaN: exponent all ones, mantissa MSB set. Every
    /// NaN-producing path yields exactly this pattern.
    pub const NAN: Float128 = Float128 {
        bits: UInt128::from_halves(0x7fff_8000_0000_0000, 0),
    };

    pub const fn from_bits(bits: UInt128) -> Float128 {
        Float128 { bits }
    }

    pub const fn to_bits(self) -> UInt128 {
        self.bits
    }

    fn biased_exponent(self) -> i32 {
        ((self.bits.hi() >> 48) & 0x7fff) as i32
    }

    pub(crate) fn mantissa_field(self) -> UInt128 {
        self.bits & MANT_MASK
    }

    /// The raw sign bit, including NaN's. Use [`Float128::is_sign_minus`]
    /// for the reported sign.
    pub(crate) fn raw_sign(self) -> bool {
        self.bits.bit(127)
    }

    /// The 113-bit significand of a normal value: the mantissa field with
    /// the implicit leading 1 made explicit.
    pub(crate) fn significand(self) -> UInt128 {
        self.mantissa_field() | IMPLICIT_BIT
    }

    pub(crate) fn with_sign(self, negative: bool) -> Float128 {
        Float128 {
            bits: if negative {
                self.bits | SIGN_MASK
            } else {
                self.bits & !SIGN_MASK
            },
        }
    }

    pub(crate) fn signed_zero(negative: bool) -> Float128 {
        if negative { Float128::NEG_ZERO } else { Float128::ZERO }
    }

    pub(crate) fn signed_infinity(negative: bool) -> Float128 {
        if negative {
            Float128::NEG_INFINITY
        } else {
            Float128::INFINITY
        }
    }

    pub fn classify(self) -> FpClass {
        let exponent = self.biased_exponent();
        if exponent == EXP_SPECIAL {
            if self.mantissa_field().is_zero() {
                FpClass::Infinite
            } else {
                FpClass::Nan
            }
        } else if exponent == 0 && self.mantissa_field().is_zero() {
            FpClass::Zero
        } else {
            FpClass::Normal
        }
    }

    pub fn is_zero(self) -> bool {
        self.classify() == FpClass::Zero
    }

    pub fn is_infinite(self) -> bool {
        self.classify() == FpClass::Infinite
    }

    pub fn is_nan(self) -> bool {
        self.classify() == FpClass::Nan
    }

    /// Whether the sign bit is set; always `false` for NaN regardless of
    /// the raw bit.
    pub fn is_sign_minus(self) -> bool {
        !self.is_nan() && self.raw_sign()
    }

    /// True iff the value is `±2^k`: a normal value whose mantissa field is
    /// entirely zero.
    pub fn is_power_of_two(self) -> bool {
        self.classify() == FpClass::Normal && self.mantissa_field().is_zero()
    }

    /// Decomposes into `(m, e)` with `self == m * 2^e` and `|m|` in
    /// `[0.5, 1)`: the exponent field is forced to biased `16382`, sign and
    /// mantissa bits preserved. Specials pass through with exponent 0.
    pub fn frexp(self) -> (Float128, i32) {
        if self.classify() != FpClass::Normal {
            return (self, 0);
        }
        let m = Float128 {
            bits: (self.bits & !EXP_MASK) | UInt128::from_halves(0x3ffe_0000_0000_0000, 0),
        };
        (m, self.biased_exponent() - EXP_BIAS + 1)
    }

    /// Inverse of [`Float128::frexp`]: installs biased exponent
    /// `e - 1 + 16383`, leaving sign and mantissa untouched. Specials pass
    /// through; out-of-range exponents saturate to signed infinity or
    /// signed zero.
    pub fn ldexp(m: Float128, e: i32) -> Float128 {
        if m.classify() != FpClass::Normal {
            return m;
        }
        let biased = e - 1 + EXP_BIAS;
        if biased >= EXP_SPECIAL {
            return Float128::signed_infinity(m.raw_sign());
        }
        if biased <= 0 {
            return Float128::signed_zero(m.raw_sign());
        }
        Float128 {
            bits: (m.bits & !EXP_MASK) | (UInt128::from(biased as u64) << MANT_BITS),
        }
    }

    /// Packs a 113-bit significand (1-based MSB at position 113) and an
    /// exponent `e` such that the value is `significand * 2^(e - 113)`.
    /// Out-of-range exponents saturate to signed infinity or signed zero.
    pub(crate) fn pack(negative: bool, significand: UInt128, e: i32) -> Float128 {
        debug_assert_eq!(significand.msb(), 113);
        let biased = e - 1 + EXP_BIAS;
        if biased >= EXP_SPECIAL {
            return Float128::signed_infinity(negative);
        }
        if biased <= 0 {
            return Float128::signed_zero(negative);
        }
        let sign = if negative { SIGN_MASK } else { UInt128::ZERO };
        Float128 {
            bits: sign
                | (UInt128::from(biased as u64) << MANT_BITS)
                | (significand & MANT_MASK),
        }
    }

    /// Truncating conversion to double precision: the top 52 mantissa bits
    /// survive, the remaining 60 are dropped.
    pub fn to_f64(self) -> f64 {
        match self.classify() {
            FpClass::Zero => {
                if self.raw_sign() {
                    -0.0
                } else {
                    0.0
                }
            }
            FpClass::Infinite => {
                if self.raw_sign() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            FpClass::Nan => f64::NAN,
            FpClass::Normal => {
                let (m, e) = self.frexp();
                let top52 = (m.mantissa_field() >> 60).lo();
                let d = hostmath::ldexp(f64::from_bits(0x3fe0_0000_0000_0000 | top52), e);
                if self.raw_sign() { -d } else { d }
            }
        }
    }
}

impl From<f64> for Float128 {
    /// Lossless conversion: the 52 source mantissa bits are left-justified
    /// into the 112-bit field (the remaining 60 bits are zero, since the
    /// source offers no more precision).
    fn from(d: f64) -> Float128 {
        if d.is_nan() {
            return Float128::NAN;
        }
        if d.is_infinite() {
            return Float128::signed_infinity(d.is_sign_negative());
        }
        if d == 0.0 {
            return Float128::signed_zero(d.is_sign_negative());
        }
        let (m, e) = hostmath::frexp(d);
        let biased = (e - 1 + EXP_BIAS) as u64;
        let frac52 = m.to_bits() & 0x000f_ffff_ffff_ffff;
        let sign = if m.is_sign_negative() {
            SIGN_MASK
        } else {
            UInt128::ZERO
        };
        Float128 {
            bits: sign | UInt128::from_halves(biased << 48, 0) | (UInt128::from(frac52) << 60),
        }
    }
}

impl From<Float128> for f64 {
    fn from(f: Float128) -> f64 {
        f.to_f64()
    }
}

impl PartialEq for Float128 {
    /// Bit equality, except that NaN is unequal to everything (including
    /// itself) and `+0 == -0`.
    fn eq(&self, other: &Float128) -> bool {
        if self.is_nan() || other.is_nan() {
            return false;
        }
        if self.is_zero() && other.is_zero() {
            return true;
        }
        self.bits == other.bits
    }
}

impl PartialOrd for Float128 {
    /// Orders by sign, then by exponent-and-mantissa magnitude (reversed
    /// for negatives). NaN is unordered against everything.
    fn partial_cmp(&self, other: &Float128) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if self.is_zero() && other.is_zero() {
            return Some(Ordering::Equal);
        }
        let (sx, sy) = (self.raw_sign(), other.raw_sign());
        if sx != sy {
            return Some(if sx { Ordering::Less } else { Ordering::Greater });
        }
        let magnitude = (self.bits & !SIGN_MASK).cmp(&(other.bits & !SIGN_MASK));
        Some(if sx { magnitude.reverse() } else { magnitude })
    }
}

impl fmt::Display for Float128 {
    /// The canonical limb form: four 8-hex-digit groups, most significant
    /// first, comma-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hi, lo) = (self.bits.hi(), self.bits.lo());
        write!(
            f,
            "{:08x},{:08x},{:08x},{:08x}",
            (hi >> 32) as u32,
            hi as u32,
            (lo >> 32) as u32,
            lo as u32
        )
    }
}

impl fmt::Debug for Float128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float128({self})")
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for Float128 {
    /// Serializes the raw bit pattern as a base-16 digit string, so NaN and
    /// signed zeros survive the round trip bit-exactly.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let text = self
            .bits
            .to_string_radix(16)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::de::Deserialize<'de> for Float128 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Float128, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_str(Float128Visitor)
    }
}

#[cfg(feature = "serde")]
struct Float128Visitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for Float128Visitor {
    type Value = Float128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a base-16 Float128 bit pattern")
    }

    fn visit_str<E>(self, s: &str) -> std::result::Result<Float128, E>
    where
        E: serde::de::Error,
    {
        use serde::de::Unexpected;
        UInt128::from_str_radix(s, 16)
            .map(Float128::from_bits)
            .map_err(|_| E::invalid_value(Unexpected::Str(s), &self))
    }
}
