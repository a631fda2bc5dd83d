//! Pure `frexp`/`ldexp` over the `f64` bit pattern.
//!
//! One implementation for every platform; no libm and no conditional
//! compilation. Both functions are pure and total.

const F64_EXP_MASK: u64 = 0x7ff0_0000_0000_0000;
const F64_EXP_SHIFT: u32 = 52;

/// Decomposes `x` into `(m, e)` with `x == m * 2^e` and `|m|` in
/// `[0.5, 1)`. Zero, infinities, and NaN return `(x, 0)`.
pub(crate) fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let raw_exp = ((bits & F64_EXP_MASK) >> F64_EXP_SHIFT) as i32;
    if raw_exp == 0 {
        // Subnormal: scale into normal range, then rebase the exponent.
        let (m, e) = frexp(x * f64::from_bits(0x4330_0000_0000_0000)); // 2^52
        return (m, e - 52);
    }
    let m = f64::from_bits((bits & !F64_EXP_MASK) | (0x3fe << F64_EXP_SHIFT));
    (m, raw_exp - 1022)
}

/// Scales `m` by `2^e`, saturating to infinity or zero past the `f64`
/// range. Zero, infinities, and NaN pass through unchanged.
pub(crate) fn ldexp(m: f64, e: i32) -> f64 {
    if m == 0.0 || !m.is_finite() || e == 0 {
        return m;
    }
    let mut m = m;
    let mut e = e;
    while e > 1023 {
        m *= f64::from_bits(0x7fe0_0000_0000_0000); // 2^1023
        e -= 1023;
        if !m.is_finite() {
            return m;
        }
    }
    while e < -1022 {
        m *= f64::from_bits(0x0010_0000_0000_0000); // 2^-1022
        e += 1022;
        if m == 0.0 {
            return m;
        }
    }
    m * f64::from_bits(((e + 1023) as u64) << F64_EXP_SHIFT)
}
