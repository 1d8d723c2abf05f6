//! FET-style soft clipper for harmonic coloration.
//!
//! [`saturate`] is stateless: the same input and drive always give the same
//! output, so it can run on each channel independently and at any rate.
//!
//! ```text
//!          |x| ≤ t : x                                  (untouched)
//!          |x| > t : t + w · f(u) + color               (soft knee)
//!                    u = min((|x| − t) / w, 1.5)
//!                    f(u) = u − 4u³/27                  (f(1.5) = 1, f'(1.5) = 0)
//!                    w = 1 − t
//! output = sign(x) · min(shaped, 1)
//! ```
//!
//! The threshold `t` drops from 1.0 (drive 0: a plain 0 dBFS limiter) to
//! 0.5 at drive 1, and further for the extra drive added in all-buttons mode.

use libm::copysignf;

/// Threshold drop per unit of drive.
const KNEE_RANGE: f32 = 0.5;

/// Threshold never goes below this, however hard the stage is driven.
const MIN_THRESHOLD: f32 = 0.2;

/// Largest drive accepted.
pub const MAX_DRIVE: f32 = 2.0;

/// Scale of the sigmoidal coloration term.
const COLOR_AMOUNT: f32 = 0.1;

/// Point where the cubic knee reaches full scale with zero slope.
const KNEE_END: f32 = 1.5;

/// Width of the knee region when drive is zero.
const MIN_KNEE_WIDTH: f32 = 1e-6;

/// Amplitude where saturation starts for a given drive.
#[inline]
pub fn saturation_threshold(drive: f32) -> f32 {
    (1.0 - KNEE_RANGE * drive.clamp(0.0, MAX_DRIVE)).max(MIN_THRESHOLD)
}

/// Soft-clips `sample` with the given `drive` (0 = clean, 1 = full, up to [`MAX_DRIVE`]).
///
/// Samples below [`saturation_threshold`] pass through bit-exact. The
/// result is always within `[-1, 1]`.
///
/// ```rust
/// use gua76_core::saturate;
///
/// assert_eq!(saturate(0.3, 0.0), 0.3);
/// assert_eq!(saturate(4.0, 0.0), 1.0);
/// assert!(saturate(0.9, 1.0) < 0.9);
/// ```
#[inline]
pub fn saturate(sample: f32, drive: f32) -> f32 {
    let drive = drive.clamp(0.0, MAX_DRIVE);
    let threshold = saturation_threshold(drive);
    let width = (1.0 - threshold).max(MIN_KNEE_WIDTH);

    let magnitude = sample.abs();
    let excursion = (magnitude - threshold).max(0.0);
    let u = (excursion / width).min(KNEE_END);
    let knee = u - (4.0 / 27.0) * u * u * u;

    let shaped = magnitude.min(threshold) + width * knee;
    // Fades in with the excursion, vanishes again at full scale
    let color = COLOR_AMOUNT * drive * (u / KNEE_END) * shaped * (1.0 - shaped).max(0.0);

    copysignf((shaped + color).min(1.0), sample)
}

/// Applies [`saturate`] to every sample of `buffer`.
pub fn saturate_block(buffer: &mut [f32], drive: f32) {
    for sample in buffer.iter_mut() {
        *sample = saturate(*sample, drive);
    }
}
