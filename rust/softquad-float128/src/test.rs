//! Comprehensive tests for the Float128 type.
//!
//! This module covers:
//! - The frexp/ldexp inverse property over arbitrary bit patterns
//! - Exactness of power-of-two multiplication
//! - Randomized arithmetic cross-checks against `f64`
//! - Ordering consistency with `f64`
//! - Serde round trips

use softquad_int128::UInt128;

use crate::{Float128, FpClass};

fn f(d: f64) -> Float128 {
    Float128::from(d)
}

/// A random finite normal `f64`: random mantissa, exponent restricted to
/// the normal range, random sign.
fn random_normal_f64(rng: &mut fastrand::Rng) -> f64 {
    let mantissa = rng.u64(..) & 0x000f_ffff_ffff_ffff;
    let exponent = rng.u64(1..2046);
    let sign = (rng.bool() as u64) << 63;
    f64::from_bits(sign | (exponent << 52) | mantissa)
}

/// A random normal Float128 bit pattern, not necessarily reachable from
/// `f64` (all 112 mantissa bits exercised).
fn random_normal_float128(rng: &mut fastrand::Rng) -> Float128 {
    let biased = rng.u64(1..0x7fff);
    let sign = (rng.bool() as u64) << 63;
    let hi = sign | (biased << 48) | (rng.u64(..) & 0xffff_ffff_ffff);
    Float128::from_bits(UInt128::from_halves(hi, rng.u64(..)))
}

#[test]
fn test_frexp_ldexp_inverse_over_full_mantissa_width() {
    let mut rng = fastrand::Rng::with_seed(0xf10a_0001);
    for _ in 0..2000 {
        let x = random_normal_float128(&mut rng);
        let (m, e) = x.frexp();
        let back = Float128::ldexp(m, e);
        assert_eq!(back.to_bits(), x.to_bits(), "{x:?}");
    }
}

#[test]
fn test_one_times_one_third_round_trips() {
    let third = 1.0 / 3.0;
    let product = f(1.0) * f(third);
    assert_eq!(product.to_f64(), third);
}

#[test]
fn test_power_of_two_multiplication_is_exact() {
    for x in [3.0, 1.0 / 3.0, -7.625, 1e100, 2.5e-7, 123456.789] {
        assert_eq!(f(4.0) * f(x), f(4.0 * x), "4 * {x}");
        assert_eq!(f(x) * f(0.5), f(x * 0.5), "{x} * 0.5");
        assert_eq!(f(x) * f(-2.0), f(x * -2.0), "{x} * -2");
    }
}

#[test]
fn test_double_products_are_exact_in_quad() {
    // Two 53-bit significands need at most 106 product bits, which the
    // 112-bit mantissa absorbs without truncation, so converting back can
    // differ from the rounded native product by at most one ulp.
    let mut rng = fastrand::Rng::with_seed(0xf10a_0002);
    for _ in 0..2000 {
        let a = f64::from_bits(0x3ff0_0000_0000_0000 | (rng.u64(..) & 0xf_ffff_ffff_ffff));
        let b = f64::from_bits(0x3ff0_0000_0000_0000 | (rng.u64(..) & 0xf_ffff_ffff_ffff));
        let quad = (f(a) * f(b)).to_f64();
        let native = a * b;
        assert!(
            (quad - native).abs() <= native.abs() * 1e-15,
            "{a} * {b}: quad {quad}, native {native}"
        );
    }
}

#[test]
fn test_addition_tracks_f64() {
    let mut rng = fastrand::Rng::with_seed(0xf10a_0003);
    for _ in 0..2000 {
        let a = random_normal_f64(&mut rng);
        let b = random_normal_f64(&mut rng);
        let native = a + b;
        if !native.is_finite() {
            continue;
        }
        let quad = (f(a) + f(b)).to_f64();
        let tolerance = native.abs().max(a.abs().max(b.abs()) * 1e-15) * 1e-15;
        assert!(
            (quad - native).abs() <= tolerance.max(f64::MIN_POSITIVE),
            "{a} + {b}: quad {quad}, native {native}"
        );
    }
}

#[test]
fn test_division_tracks_f64() {
    let mut rng = fastrand::Rng::with_seed(0xf10a_0004);
    for _ in 0..2000 {
        let a = random_normal_f64(&mut rng);
        let b = random_normal_f64(&mut rng);
        let native = a / b;
        if !native.is_normal() {
            // Subnormal quotients lose the relative error bound.
            continue;
        }
        let quad = f(a).try_div(f(b)).unwrap().to_f64();
        assert!(
            (quad - native).abs() <= native.abs() * 1e-15,
            "{a} / {b}: quad {quad}, native {native}"
        );
    }
}

#[test]
fn test_remainder_matches_f64_exactly() {
    // fmod is an exact operation on both sides, so the results agree
    // bit for bit whenever they are nonzero.
    let mut rng = fastrand::Rng::with_seed(0xf10a_0005);
    for _ in 0..2000 {
        let a = random_normal_f64(&mut rng);
        let b = random_normal_f64(&mut rng);
        let native = a % b;
        let quad = f(a).try_rem(f(b)).unwrap().to_f64();
        assert_eq!(
            quad.to_bits(),
            native.to_bits(),
            "{a} % {b}: quad {quad}, native {native}"
        );
    }
}

#[test]
fn test_ordering_matches_f64() {
    let mut rng = fastrand::Rng::with_seed(0xf10a_0006);
    for _ in 0..2000 {
        let a = random_normal_f64(&mut rng);
        let b = random_normal_f64(&mut rng);
        assert_eq!(f(a).partial_cmp(&f(b)), a.partial_cmp(&b), "{a} vs {b}");
        assert_eq!(f(a) == f(b), a == b);
    }
}

#[test]
fn test_sum_of_opposites_is_positive_zero() {
    let mut rng = fastrand::Rng::with_seed(0xf10a_0007);
    for _ in 0..200 {
        let x = random_normal_float128(&mut rng);
        let sum = x + (-x);
        assert_eq!(sum.classify(), FpClass::Zero);
        assert!(!sum.is_sign_minus());
    }
}

#[test]
fn test_subtraction_cancellation_normalizes() {
    // 1 + 2^-100 minus 1 recovers 2^-100 exactly: the difference is
    // left-normalized across nearly the whole mantissa width.
    let tiny = Float128::ldexp(f(0.5), -99); // 2^-100
    let sum = Float128::ONE + tiny;
    assert!(sum != Float128::ONE);
    assert_eq!(sum - Float128::ONE, tiny);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trips_bit_patterns() {
    let values = [
        Float128::ZERO,
        Float128::NEG_ZERO,
        Float128::ONE,
        Float128::NAN,
        Float128::NEG_INFINITY,
        f(1.0 / 3.0),
    ];
    for value in values {
        let json = serde_json::to_string(&value).unwrap();
        let back: Float128 = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_bits(), value.to_bits());
    }
    assert!(serde_json::from_str::<Float128>("\"quux\"").is_err());
}
