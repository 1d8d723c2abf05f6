//! Level meters with analog-style ballistics.
//!
//! All meters update once per block. Their time constants are converted to
//! per-block coefficients from the block length, so a meter reads the same
//! whether the host calls with 32 or 2048 samples.
//!
//! - [`PeakMeter`] - instant rise, exponential decay
//! - [`GainReductionMeter`] - one-pole smoothed gain factor
//! - [`RmsMeter`] - one-pole smoothed block RMS

use libm::sqrtf;

use crate::math::{block_coefficient, meter_db};

/// Largest absolute sample value in `buffer` (0 for an empty buffer).
#[inline]
pub fn block_peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |peak, &x| peak.max(x.abs()))
}

/// Peak-hold-with-decay update.
///
/// `max(max|buffer|, current · (1 − decay_alpha))`: a new block maximum
/// registers immediately, otherwise the held peak decays exponentially.
///
/// ```rust
/// use gua76_core::update_peak;
///
/// assert_eq!(update_peak(&[0.0, 0.8, 0.1], 0.5, 0.1), 0.8);
/// assert_eq!(update_peak(&[0.0, 0.1], 0.5, 0.1), 0.45);
/// ```
#[inline]
pub fn update_peak(buffer: &[f32], current: f32, decay_alpha: f32) -> f32 {
    block_peak(buffer).max(current * (1.0 - decay_alpha))
}

/// Peak meter with instant attack and exponential decay.
#[derive(Debug, Clone)]
pub struct PeakMeter {
    peak: f32,
    sample_rate: f32,
    /// Decay time constant in seconds
    decay_s: f32,
}

impl PeakMeter {
    /// Creates a meter at silence.
    pub fn new(sample_rate: f32, decay_s: f32) -> Self {
        Self {
            peak: 0.0,
            sample_rate,
            decay_s,
        }
    }

    /// Feeds one block and returns the new held peak (linear).
    pub fn update(&mut self, buffer: &[f32]) -> f32 {
        let alpha = block_coefficient(self.decay_s, self.sample_rate, buffer.len());
        self.peak = update_peak(buffer, self.peak, alpha);
        self.peak
    }

    /// Held peak, linear.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Held peak in dB (floored at −90 dB).
    pub fn peak_db(&self) -> f32 {
        meter_db(self.peak)
    }

    /// Drops the held peak to silence.
    pub fn reset(&mut self) {
        self.peak = 0.0;
    }
}

/// Smoothed gain-reduction display.
///
/// Holds a linear gain factor (1.0 = no reduction) that follows the target
/// handed in each block through a one-pole filter.
#[derive(Debug, Clone)]
pub struct GainReductionMeter {
    gain: f32,
    sample_rate: f32,
    smooth_s: f32,
}

impl GainReductionMeter {
    /// Creates a meter showing no reduction.
    pub fn new(sample_rate: f32, smooth_s: f32) -> Self {
        Self {
            gain: 1.0,
            sample_rate,
            smooth_s,
        }
    }

    /// Moves the display toward `target_gain` for a block of `len` samples.
    pub fn update(&mut self, target_gain: f32, len: usize) -> f32 {
        let alpha = block_coefficient(self.smooth_s, self.sample_rate, len);
        let target = target_gain.clamp(0.0, 1.0);
        self.gain += alpha * (target - self.gain);
        self.gain
    }

    /// Displayed gain factor, linear.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Displayed reduction in dB (≤ 0, floored at −90 dB).
    pub fn reduction_db(&self) -> f32 {
        meter_db(self.gain)
    }

    /// Returns the display to unity (0 dB of reduction).
    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

/// Block-RMS meter with one-pole smoothing across blocks.
#[derive(Debug, Clone)]
pub struct RmsMeter {
    level: f32,
    sample_rate: f32,
    smooth_s: f32,
}

impl RmsMeter {
    /// Creates a meter at silence.
    pub fn new(sample_rate: f32, smooth_s: f32) -> Self {
        Self {
            level: 0.0,
            sample_rate,
            smooth_s,
        }
    }

    /// Feeds a stereo block; the RMS is taken over both channels together.
    pub fn update(&mut self, left: &[f32], right: &[f32]) -> f32 {
        let count = left.len() + right.len();
        if count == 0 {
            return self.level;
        }
        let sum_sq: f32 = left.iter().chain(right.iter()).map(|x| x * x).sum();
        let block_rms = sqrtf(sum_sq / count as f32);

        let alpha = block_coefficient(self.smooth_s, self.sample_rate, left.len().max(right.len()));
        self.level += alpha * (block_rms - self.level);
        self.level
    }

    /// Smoothed RMS, linear.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Smoothed RMS in dB (floored at −90 dB).
    pub fn level_db(&self) -> f32 {
        meter_db(self.level)
    }

    /// Drops the meter to silence.
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
