//! Fixed-width 128-bit integer arithmetic built from four 32-bit limbs.
//!
//! This crate provides two immutable value types over a shared limb store:
//!
//! - [`UInt128`] - the unsigned engine: carry/borrow propagation, schoolbook
//!   multiplication truncated to 128 bits, restoring long division,
//!   limb-crossing shifts, and bitwise operations
//! - [`Int128`] - the two's-complement interpretation of the same bits, with
//!   sign-aware comparison, negation, and truncating division
//!
//! Both types parse from and format to arbitrary radixes (2-36) through a
//! shared codec, reachable via `FromStr`/`Display` for base 10 and
//! `from_str_radix`/`to_string_radix` for everything else.
//!
//! Addition, subtraction, and multiplication wrap modulo 2^128 by design;
//! only division by zero, `Int128::MIN / -1`, malformed digit strings, and
//! narrowing conversions report errors.

pub mod int128;
mod radix;
pub mod uint128;

pub use int128::Int128;
pub use uint128::UInt128;
