//! Float128 arithmetic: significand alignment, long division, and
//! renormalization over the raw limbs.

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use softquad_common::{Result, error::Error};
use softquad_int128::UInt128;

use crate::float128::{Float128, FpClass, SIGN_MASK};

impl Neg for Float128 {
    type Output = Float128;

    fn neg(self) -> Float128 {
        Float128::from_bits(self.to_bits() ^ SIGN_MASK)
    }
}

impl Mul for Float128 {
    type Output = Float128;

    /// Truncating multiplication over 57-bit significand halves.
    ///
    /// A power-of-two operand takes an exact rescaling path; otherwise the
    /// top 57 bits of each significand (implicit 1 included) are multiplied
    /// into an up-to-114-bit product, renormalized, and repacked.
    fn mul(self, rhs: Float128) -> Float128 {
        let negative = self.raw_sign() != rhs.raw_sign();
        match (self.classify(), rhs.classify()) {
            (FpClass::Nan, _) | (_, FpClass::Nan) => Float128::NAN,
            (FpClass::Zero, FpClass::Infinite) | (FpClass::Infinite, FpClass::Zero) => {
                Float128::NAN
            }
            (FpClass::Infinite, _) | (_, FpClass::Infinite) => {
                Float128::signed_infinity(negative)
            }
            (FpClass::Zero, _) | (_, FpClass::Zero) => Float128::signed_zero(negative),
            (FpClass::Normal, FpClass::Normal) => {
                let (ml, el) = self.frexp();
                let (mr, er) = rhs.frexp();
                // An exact power of two only moves the other operand's
                // exponent; skipping the product avoids precision loss.
                if self.is_power_of_two() {
                    return Float128::ldexp(mr.with_sign(negative), el + er - 1);
                }
                if rhs.is_power_of_two() {
                    return Float128::ldexp(ml.with_sign(negative), el + er - 1);
                }
                let a = UInt128::from((ml.significand() >> 56).lo());
                let b = UInt128::from((mr.significand() >> 56).lo());
                let mut product = a * b;
                let mut exponent = el + er - 1;
                if product.msb() > 113 {
                    product = product >> 1;
                    exponent += 1;
                }
                Float128::pack(negative, product, exponent)
            }
        }
    }
}

impl Add for Float128 {
    type Output = Float128;

    /// Magnitude-aligned addition: the smaller operand's significand is
    /// shifted right by the exponent gap, then summed or differenced and
    /// renormalized. Exact cancellation yields canonical +0.
    fn add(self, rhs: Float128) -> Float128 {
        match (self.classify(), rhs.classify()) {
            (FpClass::Nan, _) | (_, FpClass::Nan) => Float128::NAN,
            (FpClass::Infinite, FpClass::Infinite) => {
                if self.raw_sign() == rhs.raw_sign() {
                    self
                } else {
                    Float128::NAN
                }
            }
            (FpClass::Infinite, _) => self,
            (_, FpClass::Infinite) => rhs,
            (FpClass::Zero, FpClass::Zero) => {
                Float128::signed_zero(self.raw_sign() && rhs.raw_sign())
            }
            (FpClass::Zero, _) => rhs,
            (_, FpClass::Zero) => self,
            (FpClass::Normal, FpClass::Normal) => add_normal(self, rhs),
        }
    }
}

fn add_normal(x: Float128, y: Float128) -> Float128 {
    let (mx, ex) = x.frexp();
    let (my, ey) = y.frexp();
    let (sig_x, sig_y) = (mx.significand(), my.significand());
    // Order by magnitude: exponent first, then significand.
    let x_larger = (ex, sig_x) >= (ey, sig_y);
    let (sign_l, sig_l, exp_l, sign_s, sig_s, exp_s) = if x_larger {
        (x.raw_sign(), sig_x, ex, y.raw_sign(), sig_y, ey)
    } else {
        (y.raw_sign(), sig_y, ey, x.raw_sign(), sig_x, ex)
    };
    let gap = (exp_l - exp_s) as u32;
    if gap > 112 {
        // The smaller operand is entirely below the precision of the larger.
        return if x_larger { x } else { y };
    }
    let aligned = sig_s >> gap;
    if sign_l == sign_s {
        let mut sum = sig_l + aligned;
        let mut exponent = exp_l;
        if sum.msb() > 113 {
            sum = sum >> 1;
            exponent += 1;
        }
        Float128::pack(sign_l, sum, exponent)
    } else {
        let diff = sig_l - aligned;
        if diff.is_zero() {
            return Float128::ZERO;
        }
        let shift = 113 - diff.msb();
        Float128::pack(sign_l, diff << shift, exp_l - shift as i32)
    }
}

impl Sub for Float128 {
    type Output = Float128;

    fn sub(self, rhs: Float128) -> Float128 {
        self + (-rhs)
    }
}

macro_rules! forward_assign_op {
    (impl $imp:ident, $method:ident => $op:tt for $t:ty) => {
        impl $imp for $t {
            fn $method(&mut self, rhs: $t) {
                *self = *self $op rhs;
            }
        }
    };
}

forward_assign_op!(impl AddAssign, add_assign => + for Float128);
forward_assign_op!(impl SubAssign, sub_assign => - for Float128);
forward_assign_op!(impl MulAssign, mul_assign => * for Float128);

impl Float128 {
    /// Division via a 114-step restoring long division of the 113-bit
    /// significands.
    ///
    /// Fails with `DivisionByZero` for any zero divisor, including `0/0`
    /// and `inf/0`. NaN operands and `inf/inf` produce NaN; an infinite
    /// dividend gives signed infinity, an infinite divisor signed zero.
    pub fn try_div(self, rhs: Float128) -> Result<Float128> {
        if rhs.is_zero() {
            return Err(Error::division_by_zero());
        }
        let negative = self.raw_sign() != rhs.raw_sign();
        match (self.classify(), rhs.classify()) {
            (FpClass::Nan, _) | (_, FpClass::Nan) => Ok(Float128::NAN),
            (FpClass::Infinite, FpClass::Infinite) => Ok(Float128::NAN),
            (FpClass::Infinite, _) => Ok(Float128::signed_infinity(negative)),
            (_, FpClass::Infinite) => Ok(Float128::signed_zero(negative)),
            (FpClass::Zero, _) => Ok(Float128::signed_zero(negative)),
            (FpClass::Normal, FpClass::Normal) => {
                let (mx, ex) = self.frexp();
                let (my, ey) = rhs.frexp();
                let divisor = my.significand();
                let mut rem = mx.significand();
                // quotient = floor(sig_x * 2^113 / sig_y), 113 or 114 bits.
                let mut quotient = UInt128::ZERO;
                for _ in 0..114 {
                    quotient = quotient << 1;
                    if rem >= divisor {
                        rem = rem - divisor;
                        quotient = quotient | UInt128::ONE;
                    }
                    rem = rem << 1;
                }
                let mut exponent = ex - ey;
                if quotient.msb() > 113 {
                    quotient = quotient >> 1;
                    exponent += 1;
                }
                Ok(Float128::pack(negative, quotient, exponent))
            }
            // Zero divisors already returned `DivisionByZero` above.
            (FpClass::Normal, FpClass::Zero) => unreachable!(),
        }
    }

    /// Floating modulo by significand reduction (shift-subtract until the
    /// exponents meet). The result takes the dividend's sign, like
    /// `Int128` remainders; an exact zero result keeps that sign.
    ///
    /// Fails with `DivisionByZero` for a zero divisor. A NaN operand or an
    /// infinite dividend gives NaN; an infinite divisor or zero dividend
    /// returns the dividend unchanged.
    pub fn try_rem(self, rhs: Float128) -> Result<Float128> {
        if rhs.is_zero() {
            return Err(Error::division_by_zero());
        }
        match (self.classify(), rhs.classify()) {
            (FpClass::Nan, _) | (_, FpClass::Nan) => Ok(Float128::NAN),
            (FpClass::Infinite, _) => Ok(Float128::NAN),
            (_, FpClass::Infinite) => Ok(self),
            (FpClass::Zero, _) => Ok(self),
            (FpClass::Normal, FpClass::Normal) => {
                let negative = self.raw_sign();
                let (mx, ex) = self.frexp();
                let (my, ey) = rhs.frexp();
                let divisor = my.significand();
                let mut sig = mx.significand();
                let mut exponent = ex;
                if (exponent, sig) < (ey, divisor) {
                    // |self| < |rhs|: nothing to reduce.
                    return Ok(self);
                }
                while exponent > ey {
                    if sig >= divisor {
                        sig = sig - divisor;
                    }
                    sig = sig << 1;
                    exponent -= 1;
                }
                if sig >= divisor {
                    sig = sig - divisor;
                }
                if sig.is_zero() {
                    return Ok(Float128::signed_zero(negative));
                }
                let shift = 113 - sig.msb();
                Ok(Float128::pack(negative, sig << shift, exponent - shift as i32))
            }
            // Zero divisors already returned `DivisionByZero` above.
            (FpClass::Normal, FpClass::Zero) => unreachable!(),
        }
    }
}
