//! Software quadruple-precision (binary128) floating point.
//!
//! [`Float128`] stores the IEEE binary128 bit layout - sign(1) |
//! exponent(15, bias 16383) | mantissa(112, implicit leading 1) - in a
//! [`softquad_int128::UInt128`] and implements every operation over the raw
//! limbs:
//!
//! - classification into a closed variant set ([`FpClass`])
//! - lossless bridging from `f64` and truncating bridging back
//! - `frexp`/`ldexp` decomposition over the packed form
//! - multiply, add/subtract, divide, and modulo with manual significand
//!   normalization (power-of-two multiplications are exact)
//!
//! Division and modulo by zero report `DivisionByZero`; everything else is
//! total, with NaN propagation following IEEE conventions and one canonical
//! quiet-NaN pattern produced by every NaN path.

mod arith;
pub mod float128;
mod hostmath;

pub use float128::{Float128, FpClass};

#[cfg(test)]
mod test;
