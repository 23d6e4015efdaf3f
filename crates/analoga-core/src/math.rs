//! Mathematical helpers shared by every DSP stage.
//!
//! All functions are allocation-free and `no_std` compatible.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`]
//!
//! # Shaping
//!
//! | Function | Curve | Used by |
//! |----------|-------|---------|
//! | [`quadratic_clip`] | `x(1.5 - 0.5|x|)`, hard limit above 1 | global drive |
//! | [`cubic_clip`] | `x - k·x³`, clamped to ±1 | filter profiles |
//! | [`rational_clip`] | `x / (1 + |x|)` | filter profiles |
//!
//! # Interpolation
//!
//! - [`catmull_rom`] - 4-point cubic used by delay lines

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// ```rust
/// use analoga_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs below 1e-10 read as -200 dB.
///
/// ```rust
/// use analoga_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) + 6.02).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Quadratic soft clip with a hard ceiling.
///
/// Inside ±1 the curve is `x·(1.5 − 0.5·|x|)`, which reaches exactly ±1 with
/// zero slope at the boundary; beyond it the output is pinned to ±1.
#[inline]
pub fn quadratic_clip(x: f32) -> f32 {
    if x > 1.0 {
        1.0
    } else if x < -1.0 {
        -1.0
    } else {
        x * (1.5 - 0.5 * x.abs())
    }
}

/// Cubic soft clip `x − k·x³`, clamped to ±1.
#[inline]
pub fn cubic_clip(x: f32, k: f32) -> f32 {
    (x - k * x * x * x).clamp(-1.0, 1.0)
}

/// Rational saturator `x / (1 + |x|)`.
#[inline]
pub fn rational_clip(x: f32) -> f32 {
    x / (1.0 + x.abs())
}

/// Flush denormal values to zero.
///
/// Recursive filters decaying toward silence can produce subnormal floats,
/// which are very slow on most CPUs. Every feedback state in the workspace
/// passes through this before being stored.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Linear crossfade: `dry·(1 − mix) + wet·mix`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// 4-point Catmull-Rom interpolation.
///
/// `s0..s3` are the samples at positions `-1, 0, 1, 2` relative to the
/// integer read index and `frac` is the fractional offset in `[0, 1)`.
/// Passes exactly through `s1` at `frac = 0`.
#[inline]
pub fn catmull_rom(s0: f32, s1: f32, s2: f32, s3: f32, frac: f32) -> f32 {
    let a = -0.5 * s0 + 1.5 * s1 - 1.5 * s2 + 0.5 * s3;
    let b = s0 - 2.5 * s1 + 2.0 * s2 - 0.5 * s3;
    let c = -0.5 * s0 + 0.5 * s2;
    ((a * frac + b) * frac + c) * frac + s1
}

/// Wrap a phase into `[0, 1)` assuming it overshot by less than one cycle.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    if phase >= 1.0 {
        phase - 1.0
    } else if phase < 0.0 {
        phase + 1.0
    } else {
        phase
    }
}

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]` linearly.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip_at_common_levels() {
        for db in [-24.0, -12.0, -6.0, 0.0, 6.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn quadratic_clip_is_continuous_at_unity() {
        assert!((quadratic_clip(1.0) - 1.0).abs() < 1e-6);
        assert!((quadratic_clip(0.9999) - 1.0).abs() < 1e-3);
        assert_eq!(quadratic_clip(3.0), 1.0);
        assert_eq!(quadratic_clip(-3.0), -1.0);
        assert!((quadratic_clip(0.5) - 0.625).abs() < 1e-6);
    }

    #[test]
    fn cubic_clip_stays_bounded() {
        for i in -100..=100 {
            let x = i as f32 * 0.05;
            let y = cubic_clip(x, 0.25);
            assert!((-1.0..=1.0).contains(&y), "cubic_clip({x}) = {y}");
        }
    }

    #[test]
    fn rational_clip_is_odd_and_below_one() {
        assert!((rational_clip(1.0) - 0.5).abs() < 1e-6);
        assert!((rational_clip(-1.0) + 0.5).abs() < 1e-6);
        assert!(rational_clip(1000.0) < 1.0);
    }

    #[test]
    fn catmull_rom_hits_knots_and_lines() {
        assert_eq!(catmull_rom(0.0, 1.0, 2.0, 3.0, 0.0), 1.0);
        // A straight line is reproduced exactly.
        let mid = catmull_rom(0.0, 1.0, 2.0, 3.0, 0.5);
        assert!((mid - 1.5).abs() < 1e-6, "got {mid}");
    }

    #[test]
    fn flush_denormal_zeroes_tiny_values() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }

    #[test]
    fn map_range_endpoints() {
        assert!((map_range(0.0, 0.0, 7.0, 0.2, 0.9) - 0.2).abs() < 1e-6);
        assert!((map_range(7.0, 0.0, 7.0, 0.2, 0.9) - 0.9).abs() < 1e-6);
    }
}
