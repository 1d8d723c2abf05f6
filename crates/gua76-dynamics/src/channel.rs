//! One detector chain: Left or Mid, Right or Side.
//!
//! Each chain owns its sidechain filters, its envelope detector and its
//! smoothed gain factor. The processor clocks the chain once per sample at
//! whatever rate the dynamics stage is running.

use gua76_core::{EnvelopeDetector, FilterCascade, FilterKind};

use crate::gain::GainComputer;

/// Sidechain conditioning settings for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidechainFilters {
    /// High-pass cutoff in Hz, or `None` when the high-pass is off.
    pub highpass_hz: Option<f32>,
    /// Low-pass cutoff in Hz, or `None` when the low-pass is off.
    pub lowpass_hz: Option<f32>,
    /// Resonance shared by both filters.
    pub q: f32,
}

impl SidechainFilters {
    /// Both filters off.
    pub const OFF: Self = Self {
        highpass_hz: None,
        lowpass_hz: None,
        q: gua76_core::BUTTERWORTH_Q,
    };
}

/// Detector timing for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorTiming {
    /// Attack time constant in seconds.
    pub attack_s: f32,
    /// Release time constant in seconds.
    pub release_s: f32,
    /// Program-dependent attack amount.
    pub program_dependency: f32,
}

/// Detector, sidechain filters and gain state for a single chain.
#[derive(Debug, Clone)]
pub struct CompressorChannel {
    detector: EnvelopeDetector,
    highpass: FilterCascade,
    lowpass: FilterCascade,
    highpass_on: bool,
    lowpass_on: bool,
    /// Smoothed gain factor (1.0 = no reduction)
    gain: f32,
    /// Lowest smoothed gain since the last [`take_min_gain`](Self::take_min_gain)
    min_gain: f32,
}

impl CompressorChannel {
    /// Creates an idle chain clocked at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            detector: EnvelopeDetector::new(sample_rate),
            highpass: FilterCascade::new(),
            lowpass: FilterCascade::new(),
            highpass_on: false,
            lowpass_on: false,
            gain: 1.0,
            min_gain: 1.0,
        }
    }

    /// Applies the block's settings at processing rate `rate`.
    ///
    /// Filter coefficients are only recomputed when a cutoff or the Q moved
    /// by more than the cascade epsilon, or when the rate changed. A filter
    /// that is switched off is cleared so switching it back on starts from
    /// silence.
    pub fn configure(&mut self, timing: &DetectorTiming, filters: &SidechainFilters, rate: f32) {
        self.detector.set_sample_rate(rate);
        self.detector.set_times(timing.attack_s, timing.release_s);
        self.detector.set_program_dependency(timing.program_dependency);

        self.highpass_on = configure_filter(
            &mut self.highpass,
            FilterKind::Highpass,
            filters.highpass_hz,
            filters.q,
            rate,
        );
        self.lowpass_on = configure_filter(
            &mut self.lowpass,
            FilterKind::Lowpass,
            filters.lowpass_hz,
            filters.q,
            rate,
        );
    }

    /// Runs one sidechain sample through the enabled filters.
    #[inline]
    pub fn condition(&mut self, sidechain: f32) -> f32 {
        let mut x = sidechain;
        if self.highpass_on {
            x = self.highpass.process(x);
        }
        if self.lowpass_on {
            x = self.lowpass.process(x);
        }
        x
    }

    /// Advances the envelope with a conditioned sidechain sample.
    #[inline]
    pub fn detect(&mut self, conditioned: f32) -> f32 {
        self.detector.process(conditioned)
    }

    /// Computes the gain for `envelope`, smooths it with the nominal attack
    /// coefficient, and applies it to `signal`.
    #[inline]
    pub fn apply(&mut self, signal: f32, envelope: f32, computer: &GainComputer) -> f32 {
        let target = computer.gain(envelope);
        self.gain += self.detector.attack_coeff() * (target - self.gain);
        self.min_gain = self.min_gain.min(self.gain);
        signal * self.gain
    }

    /// Current envelope.
    pub fn envelope(&self) -> f32 {
        self.detector.level()
    }

    /// Current smoothed gain factor.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Lowest gain since the previous call, then restarts tracking at the
    /// current gain.
    pub fn take_min_gain(&mut self) -> f32 {
        let min = self.min_gain;
        self.min_gain = self.gain;
        min
    }

    /// Returns envelope, gain and filter registers to their idle state.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.highpass.reset();
        self.lowpass.reset();
        self.gain = 1.0;
        self.min_gain = 1.0;
    }
}

/// Tunes `cascade` for `cutoff_hz`, or clears it when the filter is off.
/// Returns whether the filter is active.
fn configure_filter(
    cascade: &mut FilterCascade,
    kind: FilterKind,
    cutoff_hz: Option<f32>,
    q: f32,
    rate: f32,
) -> bool {
    let Some(cutoff_hz) = cutoff_hz else {
        cascade.reset();
        return false;
    };
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    let refreshed = cascade.configure(kind, cutoff_hz, q, rate);
    #[cfg(feature = "tracing")]
    if refreshed {
        tracing::trace!(?kind, cutoff_hz, q, rate, "sidechain filter coefficients refreshed");
    }
    true
}
