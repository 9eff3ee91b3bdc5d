//! Q32.32 Fixed-Point Arithmetic
//!
//! Deterministic unsigned fixed-point math for the reward engine.
//! All operations use integer arithmetic only, so every implementation
//! computes bit-identical reward amounts.
//!
//! ## Format: Q32.32
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q32.32 (64-bit unsigned integer)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [IIIIIIIIIIIIIIIIIIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF...]    │
//! │   └────────── 32 bits ───────────┘└──── 32 bits ────┘       │
//! │                                                             │
//! │  Range: 0.0 to 4294967295.99999 (approx)                    │
//! │  Precision: 1/2^32 ≈ 0.00000000023                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are widened to `u128` before shifting back, so no
//! intermediate overflows for any pair of Q32.32 operands.

use std::fmt;

/// Q32.32 fixed-point number stored as u64.
pub type Fixed = u64;

/// Number of fractional bits (32)
pub const FIXED_SCALE: u32 = 32;

/// 1.0 in fixed-point
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

/// ln(2) in fixed-point: round(0.693147180559945 * 2^32)
pub const LN_2: Fixed = 2_977_044_472;

/// Number of odd-power terms evaluated in the atanh series.
///
/// The series argument never exceeds 1/3, so each term shrinks by at
/// least 9x. Twelve terms are well below one unit of precision.
const ATANH_TERMS: u32 = 12;

/// Create a fixed-point number from an integer.
#[inline]
pub const fn from_int(i: u32) -> Fixed {
    (i as Fixed) << FIXED_SCALE
}

/// Convert fixed-point to float for display and test comparison.
///
/// Never feed the result back into reward computation.
#[inline]
pub fn to_float(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

/// Multiply two fixed-point numbers (truncating).
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as u128) * (b as u128);
    (wide >> FIXED_SCALE).min(Fixed::MAX as u128) as Fixed
}

/// Divide two fixed-point numbers (truncating).
///
/// Returns 0 on divide-by-zero.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as u128) << FIXED_SCALE;
    (wide / b as u128).min(Fixed::MAX as u128) as Fixed
}

/// Ratio of two integers as a fixed-point number.
///
/// Returns 0 when `den` is zero.
#[inline]
pub fn fixed_ratio(num: u64, den: u64) -> Fixed {
    if den == 0 {
        return 0;
    }
    let wide = (num as u128) << FIXED_SCALE;
    (wide / den as u128).min(Fixed::MAX as u128) as Fixed
}

/// Natural logarithm of a positive integer, in fixed-point.
///
/// Splits `x = 2^k * m` with `m` in `[1, 2)`, then
/// `ln(x) = k * ln(2) + ln(m)`. Inputs `0` and `1` return 0.
pub fn fixed_ln_int(x: u64) -> Fixed {
    if x <= 1 {
        return 0;
    }

    let k = 63 - x.leading_zeros();

    // Mantissa in [FIXED_ONE, 2 * FIXED_ONE)
    let mantissa = (((x as u128) << FIXED_SCALE) >> k) as Fixed;

    (k as Fixed) * LN_2 + ln_mantissa(mantissa)
}

/// ln(m) for `m` in `[1, 2)` via `ln(m) = 2 * atanh((m - 1) / (m + 1))`.
///
/// Fixed term count for determinism.
fn ln_mantissa(m: Fixed) -> Fixed {
    debug_assert!(m >= FIXED_ONE && m < 2 * FIXED_ONE);

    let z = fixed_div(m - FIXED_ONE, m + FIXED_ONE);
    let z_squared = fixed_mul(z, z);

    let mut power = z;
    let mut sum = z;
    for i in 1..ATANH_TERMS {
        power = fixed_mul(power, z_squared);
        if power == 0 {
            break;
        }
        sum += power / (2 * i as Fixed + 1);
    }

    sum << 1
}

// =============================================================================
// FIXEDNUM WRAPPER
// =============================================================================

/// Display wrapper for fixed-point values in log output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedNum(pub Fixed);

impl fmt::Debug for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:.6})", to_float(self.0))
    }
}

impl fmt::Display for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", to_float(self.0))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: Fixed, expected: f64, tolerance: f64) {
        let got = to_float(actual);
        assert!(
            (got - expected).abs() <= tolerance,
            "expected {expected}, got {got}"
        );
    }

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 4_294_967_296);
        assert_eq!(FIXED_HALF, FIXED_ONE / 2);
        assert_close(LN_2, std::f64::consts::LN_2, 1e-9);
    }

    #[test]
    fn test_fixed_mul_div() {
        assert_eq!(fixed_mul(from_int(2), from_int(3)), from_int(6));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), FIXED_ONE / 4);
        assert_eq!(fixed_div(from_int(6), from_int(2)), from_int(3));
        assert_eq!(fixed_div(FIXED_ONE, from_int(4)), FIXED_ONE / 4);
        assert_eq!(fixed_div(FIXED_ONE, 0), 0);
    }

    #[test]
    fn test_fixed_num_display() {
        assert_eq!(FixedNum(FIXED_ONE + FIXED_HALF).to_string(), "1.500000");
        assert_eq!(format!("{:?}", FixedNum(from_int(2))), "Fixed(2.000000)");
    }

    #[test]
    fn test_fixed_ratio() {
        assert_eq!(fixed_ratio(900, 1000), fixed_div(from_int(9), from_int(10)));
        assert_eq!(fixed_ratio(1000, 1000), FIXED_ONE);
        assert_eq!(fixed_ratio(0, 1000), 0);
        assert_eq!(fixed_ratio(5, 0), 0);
    }

    #[test]
    fn test_ln_small_values() {
        assert_eq!(fixed_ln_int(0), 0);
        assert_eq!(fixed_ln_int(1), 0);
        assert_eq!(fixed_ln_int(2), LN_2);
        assert_close(fixed_ln_int(5), 5f64.ln(), 1e-7);
        assert_close(fixed_ln_int(1000), 1000f64.ln(), 1e-7);
    }

    #[test]
    fn test_ln_large_values() {
        assert_close(fixed_ln_int(1_012_000), 1_012_000f64.ln(), 1e-6);
        assert_close(fixed_ln_int(1_687_871_012_000), 1_687_871_012_000f64.ln(), 1e-6);
        assert_close(fixed_ln_int(u64::MAX), (u64::MAX as f64).ln(), 1e-5);
    }

    proptest! {
        #[test]
        fn ln_tracks_float_reference(x in 2u64..u64::MAX) {
            let expected = (x as f64).ln();
            let got = to_float(fixed_ln_int(x));
            prop_assert!((got - expected).abs() < 1e-5, "ln({}) = {} vs {}", x, got, expected);
        }

        #[test]
        fn ln_is_monotonic_for_outcome_counts(n in 1u64..10_000) {
            prop_assert!(fixed_ln_int(n + 1) > fixed_ln_int(n));
        }
    }
}
