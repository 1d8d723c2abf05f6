//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`meter_db`] - Display conversion with the [`METER_FLOOR_DB`] floor
//!
//! # Ballistics
//!
//! - [`smoothing_coefficient`] - One-pole coefficient for a time constant
//! - [`block_coefficient`] - Same, for a decay applied once per block

use libm::{expf, log10f};

/// Lowest value any meter reports, in dB.
pub const METER_FLOOR_DB: f32 = -90.0;

/// Linear amplitude below which [`meter_db`] reports [`METER_FLOOR_DB`].
const METER_FLOOR_LINEAR: f32 = 1e-11;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use gua76_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Input is floored at `1e-10` so the result is always finite.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * log10f(linear.max(1e-10))
}

/// Convert a linear amplitude to dB for display.
///
/// `20·log10(linear)`, clamped to [`METER_FLOOR_DB`]. Exactly `0.0` for a
/// linear value of `1.0`.
///
/// ```rust
/// use gua76_core::{meter_db, METER_FLOOR_DB};
///
/// assert_eq!(meter_db(1.0), 0.0);
/// assert_eq!(meter_db(0.0), METER_FLOOR_DB);
/// ```
#[inline]
pub fn meter_db(linear: f32) -> f32 {
    if linear <= METER_FLOOR_LINEAR {
        return METER_FLOOR_DB;
    }
    (20.0 * log10f(linear)).max(METER_FLOOR_DB)
}

/// One-pole smoothing coefficient for a time constant.
///
/// `α = 1 − exp(−1 / (sample_rate · τ))`, used as
/// `y[n] = y[n-1] + α · (x[n] − y[n-1])`. A non-positive time constant
/// yields `1.0` (instant response).
#[inline]
pub fn smoothing_coefficient(time_constant_s: f32, sample_rate: f32) -> f32 {
    if time_constant_s <= 0.0 || sample_rate <= 0.0 {
        return 1.0;
    }
    1.0 - expf(-1.0 / (sample_rate * time_constant_s))
}

/// Coefficient for a one-pole update applied once per block of `len` samples.
///
/// Equivalent to running [`smoothing_coefficient`] `len` times, so the
/// ballistics do not depend on the host block size.
#[inline]
pub fn block_coefficient(time_constant_s: f32, sample_rate: f32, len: usize) -> f32 {
    if time_constant_s <= 0.0 || sample_rate <= 0.0 {
        return 1.0;
    }
    1.0 - expf(-(len as f32) / (sample_rate * time_constant_s))
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range. Used on filter feedback state that can decay
/// indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!(
            (original - back).abs() < 1e-5,
            "Roundtrip failed: {} -> {} -> {}",
            original,
            db,
            back
        );
    }

    #[test]
    fn test_db_known_values() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 0.001);
        assert!((db_to_linear(-10.0) - 0.316_227_8).abs() < 1e-5);
    }

    #[test]
    fn test_meter_db_floor() {
        assert_eq!(meter_db(0.0), METER_FLOOR_DB);
        assert_eq!(meter_db(-1.0), METER_FLOOR_DB);
        assert_eq!(meter_db(1e-20), METER_FLOOR_DB);
        assert_eq!(meter_db(1e-6), METER_FLOOR_DB);
        assert_eq!(meter_db(1.0), 0.0);
        assert!((meter_db(0.1) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_smoothing_coefficient() {
        // 10 ms at 1 kHz = 10 samples per time constant
        let alpha = smoothing_coefficient(0.01, 1000.0);
        assert!((alpha - (1.0 - (-0.1f32).exp())).abs() < 1e-6);
        assert_eq!(smoothing_coefficient(0.0, 48000.0), 1.0);
        assert_eq!(smoothing_coefficient(0.01, 0.0), 1.0);
    }

    #[test]
    fn test_block_coefficient_matches_repeated_steps() {
        let per_sample = smoothing_coefficient(0.05, 48000.0);
        let per_block = block_coefficient(0.05, 48000.0, 64);

        let mut stepped = 1.0f32;
        for _ in 0..64 {
            stepped -= per_sample * stepped;
        }
        let blocked = 1.0 - per_block;
        assert!((stepped - blocked).abs() < 1e-4, "{stepped} vs {blocked}");
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-38), 0.0);
    }
}
