//! Mathematical utility functions shared by the unfolding engines.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Waveshaping
//!
//! | Function | Curve | Use |
//! |----------|-------|-----|
//! | [`soft_clip`] | `tanh(x)` | Per-grain and per-voice saturation |
//! | [`sanitize_soft_clip`] | `tanh(0.7x) * 1.35`, non-finite to 0 | Pipeline sanitizer |
//!
//! # Utilities
//!
//! - [`lerp`] - Linear interpolation
//! - [`raised_cosine`] - Hann window value at a normalised position
//! - [`equal_power_pan`] - Square-root pan law
//! - [`princ_arg`] - Phase wrap into `[-π, π]`
//! - [`flush_denormal`] - Denormal protection for recursive state

use libm::{cosf, sqrtf, tanhf};

/// Full circle in radians.
pub const TWO_PI: f32 = core::f32::consts::TAU;

/// Hyperbolic tangent saturation.
///
/// # Example
/// ```rust
/// use unfoldings_core::soft_clip;
///
/// assert!(soft_clip(10.0) < 1.0);
/// assert_eq!(soft_clip(0.0), 0.0);
/// ```
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Replaces non-finite input with zero, then applies `tanh(0.7x) * 1.35`.
///
/// Output magnitude is bounded by 1.35 for any input.
#[inline]
pub fn sanitize_soft_clip(x: f32) -> f32 {
    let x = if x.is_finite() { x } else { 0.0 };
    tanhf(0.7 * x) * 1.35
}

/// Linear interpolation between `a` and `b`.
///
/// # Arguments
/// * `a` - Value at `t = 0`
/// * `b` - Value at `t = 1`
/// * `t` - Position, not clamped
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Bounds `x` to `[lo, hi]` without asserting `lo <= hi`.
///
/// When the range is inverted, values below `lo` return `lo` and everything
/// else returns `hi`. Unlike [`f32::clamp`] this never panics, so bounds
/// derived from a sample rate may cross.
#[inline]
pub fn limit(lo: f32, hi: f32, x: f32) -> f32 {
    if x < lo {
        lo
    } else if hi < x {
        hi
    } else {
        x
    }
}

/// Raised-cosine (Hann) window value at normalised position `t` in `[0, 1]`.
///
/// Zero at both ends, one at `t = 0.5`.
#[inline]
pub fn raised_cosine(t: f32) -> f32 {
    0.5 - 0.5 * cosf(TWO_PI * t)
}

/// Square-root pan law.
///
/// # Returns
/// `(left_gain, right_gain)` = `(sqrt(1 - pan), sqrt(pan))` for `pan` in `[0, 1]`.
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    (sqrtf(1.0 - pan), sqrtf(pan))
}

/// Wraps a phase into `[-π, π]`.
///
/// Non-finite input returns 0 so phase accumulators recover instead of
/// spinning forever.
#[inline]
pub fn princ_arg(mut phase: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    const PI: f32 = core::f32::consts::PI;
    while phase > PI {
        phase -= TWO_PI;
    }
    while phase < -PI {
        phase += TWO_PI;
    }
    phase
}

/// Flush values near zero to exactly zero.
///
/// Recursive state below ~1e-38 turns subnormal and slows the FPU by orders
/// of magnitude on most targets.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_zeroes_non_finite() {
        assert_eq!(sanitize_soft_clip(f32::NAN), 0.0);
        assert_eq!(sanitize_soft_clip(f32::INFINITY), 0.0);
        assert_eq!(sanitize_soft_clip(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn sanitize_bounded() {
        for x in [-1e6, -3.0, -0.5, 0.0, 0.5, 3.0, 1e6] {
            assert!(sanitize_soft_clip(x).abs() <= 1.35 + 1e-6);
        }
    }

    #[test]
    fn raised_cosine_endpoints() {
        assert!(raised_cosine(0.0).abs() < 1e-7);
        assert!(raised_cosine(1.0).abs() < 1e-6);
        assert!((raised_cosine(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn equal_power_pan_conserves_power() {
        for pan in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let (l, r) = equal_power_pan(pan);
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn princ_arg_wraps() {
        let wrapped = princ_arg(3.0 * TWO_PI + 0.5);
        assert!((wrapped - 0.5).abs() < 1e-4);
        let wrapped = princ_arg(-7.0);
        assert!(wrapped >= -core::f32::consts::PI && wrapped <= core::f32::consts::PI);
        assert_eq!(princ_arg(f32::NAN), 0.0);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn limit_in_order_range() {
        assert_eq!(limit(20.0, 100.0, 5.0), 20.0);
        assert_eq!(limit(20.0, 100.0, 50.0), 50.0);
        assert_eq!(limit(20.0, 100.0, 500.0), 100.0);
    }

    #[test]
    fn limit_crossed_range_does_not_panic() {
        // 0.48 * 30 Hz falls below the 20 Hz floor
        assert_eq!(limit(20.0, 14.4, 32.0), 14.4);
        assert_eq!(limit(20.0, 14.4, 10.0), 20.0);
        assert_eq!(limit(12.0, 9.8, 0.0), 12.0);
    }

    #[test]
    fn flush_denormal_works() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
