use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Every fractional quantity in the world (power, electricity, fluid
/// amounts, recipe progress) is stored in this type so that a restored
/// snapshot steps forward bit-for-bit like the original.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and saves, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Lossy-but-safe conversion for values read from untrusted input.
///
/// Non-finite values become zero and out-of-range values saturate.
pub fn f64_to_fixed64_saturating(v: f64) -> Fixed64 {
    if !v.is_finite() {
        return Fixed64::ZERO;
    }
    Fixed64::checked_from_num(v).unwrap_or(if v > 0.0 { Fixed64::MAX } else { Fixed64::MIN })
}

/// Whole-tick counts read from untrusted input. Non-finite and negative
/// values become zero; values past `u32::MAX` saturate.
pub fn f64_to_u32_saturating(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    if v >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    v as u32
}

/// `num / den` as Fixed64, computed without going through floating point.
#[inline]
pub fn ratio(num: i32, den: i32) -> Fixed64 {
    Fixed64::from_num(num) / Fixed64::from_num(den)
}

/// Checked division for Fixed64 that returns None on zero divisor.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}
