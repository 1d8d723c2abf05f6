//! Construction-time configuration for [`FetLimiter`](crate::FetLimiter).
//!
//! Everything here is fixed once the processor is built. Per-block knob
//! values live in [`Controls`](crate::Controls) instead.

use gua76_core::{GAIN_SMOOTHING_MS, OversampleFactor, TimeRange, oversample::scratch_len};
use thiserror::Error;

/// Largest host block the original plugin pre-allocated for.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1024;

/// Reasons a processor cannot be constructed.
///
/// This is the only fatal failure in the crate. Once a processor exists,
/// every runtime problem is clamped, floored or degraded instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    /// Sample rate is zero, negative, NaN or infinite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Maximum block size is zero.
    #[error("max block size must be at least 1 sample")]
    ZeroBlockSize,

    /// `max_block_size × factor` does not fit in memory addressing.
    #[error("oversampling scratch of {max_block_size} × {factor} samples overflows")]
    ScratchOverflow {
        /// Requested maximum host block size.
        max_block_size: usize,
        /// Requested oversampling factor.
        factor: usize,
    },
}

/// Empirically tuned constants of the dynamics model.
///
/// None of these have a single canonical analog value; they are exposed so
/// the "feel" can be adjusted without touching the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsTuning {
    /// Internal detector threshold, linear amplitude.
    pub threshold: f32,
    /// Ratio the all-buttons curve starts from.
    pub all_buttons_base_ratio: f32,
    /// Steepening applied to the all-buttons base ratio.
    pub all_buttons_ratio_multiplier: f32,
    /// Extra saturator drive added in all-buttons mode.
    pub all_buttons_drive_offset: f32,
    /// How strongly louder transients shorten the attack.
    pub program_dependency: f32,
    /// Attack knob range.
    pub attack: TimeRange,
    /// Release knob range.
    pub release: TimeRange,
    /// Peak meter decay time constant, seconds.
    pub peak_decay_s: f32,
    /// Gain-reduction meter smoothing time constant, seconds.
    pub gr_meter_smoothing_s: f32,
    /// Output RMS meter smoothing time constant, seconds.
    pub rms_meter_smoothing_s: f32,
    /// Glide time for the input and output gain knobs, milliseconds.
    pub gain_smoothing_ms: f32,
}

impl DynamicsTuning {
    /// Effective all-buttons ratio (`base × multiplier`).
    pub fn all_buttons_ratio(&self) -> f32 {
        self.all_buttons_base_ratio * self.all_buttons_ratio_multiplier
    }
}

impl Default for DynamicsTuning {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            all_buttons_base_ratio: 20.0,
            all_buttons_ratio_multiplier: 1.5,
            all_buttons_drive_offset: 0.5,
            program_dependency: gua76_core::EnvelopeDetector::DEFAULT_PROGRAM_DEPENDENCY,
            attack: TimeRange::ATTACK,
            release: TimeRange::RELEASE,
            peak_decay_s: 0.3,
            gr_meter_smoothing_s: 0.01,
            rms_meter_smoothing_s: 0.05,
            gain_smoothing_ms: GAIN_SMOOTHING_MS,
        }
    }
}

/// Everything a [`FetLimiter`](crate::FetLimiter) needs at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorConfig {
    /// Host sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block that can run oversampled; longer blocks fall back to host rate.
    pub max_block_size: usize,
    /// Oversampling ratio used when oversampling is switched on.
    pub oversample_factor: OversampleFactor,
    /// Dynamics model constants.
    pub tuning: DynamicsTuning,
}

impl ProcessorConfig {
    /// Default configuration at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Checks the values [`FetLimiter::new`](crate::FetLimiter::new) relies on.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SetupError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(SetupError::ZeroBlockSize);
        }
        if scratch_len(self.max_block_size, self.oversample_factor).is_none() {
            return Err(SetupError::ScratchOverflow {
                max_block_size: self.max_block_size,
                factor: self.oversample_factor.as_usize(),
            });
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            oversample_factor: OversampleFactor::X8,
            tuning: DynamicsTuning::default(),
        }
    }
}
