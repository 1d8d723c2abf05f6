//! Sixth-order filter built from three cascaded [`Biquad`] sections.
//!
//! Each section contributes 12 dB/octave, giving 36 dB/octave overall.
//! The cascade remembers the parameters it last applied so callers can
//! push the current control values every block without paying for a
//! coefficient recomputation unless something actually moved.

use crate::biquad::{Biquad, FilterKind};

/// Number of biquad sections in a cascade.
pub const CASCADE_SECTIONS: usize = 3;

/// Parameter change below which coefficients are not recomputed.
pub const COEFFICIENT_EPSILON: f32 = 0.01;

/// Parameters most recently applied to a [`FilterCascade`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct AppliedParams {
    kind: FilterKind,
    cutoff_hz: f32,
    q: f32,
    sample_rate: f32,
}

impl AppliedParams {
    fn differs(&self, other: &Self) -> bool {
        self.kind != other.kind
            || (self.cutoff_hz - other.cutoff_hz).abs() > COEFFICIENT_EPSILON
            || (self.q - other.q).abs() > COEFFICIENT_EPSILON
            || self.sample_rate != other.sample_rate
    }
}

/// Three identical biquad sections in series.
///
/// Section order is fixed for the lifetime of the cascade.
///
/// # Example
///
/// ```rust
/// use gua76_core::{FilterCascade, FilterKind};
///
/// let mut hpf = FilterCascade::new();
/// assert!(hpf.configure(FilterKind::Highpass, 120.0, 0.707, 48000.0));
/// // Same values again: nothing to do
/// assert!(!hpf.configure(FilterKind::Highpass, 120.0, 0.707, 48000.0));
///
/// let y = hpf.process(0.25);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterCascade {
    sections: [Biquad; CASCADE_SECTIONS],
    applied: Option<AppliedParams>,
}

impl FilterCascade {
    /// Creates a passthrough cascade with no coefficients applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `kind` / `cutoff_hz` / `q` at `sample_rate` to every section.
    ///
    /// Coefficients are recomputed only when the cutoff or Q moved by more
    /// than [`COEFFICIENT_EPSILON`], or the kind or sample rate changed.
    /// Returns `true` when a recomputation happened. State registers are
    /// never touched.
    pub fn configure(
        &mut self,
        kind: FilterKind,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) -> bool {
        let requested = AppliedParams {
            kind,
            cutoff_hz,
            q,
            sample_rate,
        };
        if let Some(applied) = &self.applied
            && !applied.differs(&requested)
        {
            return false;
        }

        for section in &mut self.sections {
            section.set_coefficients(kind, cutoff_hz, q, sample_rate);
        }
        self.applied = Some(requested);
        true
    }

    /// Cutoff most recently applied, if any.
    pub fn cutoff_hz(&self) -> Option<f32> {
        self.applied.map(|p| p.cutoff_hz)
    }

    /// Runs one sample through all three sections.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut y = input;
        for section in &mut self.sections {
            y = section.process(y);
        }
        y
    }

    /// Filters `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clears the state registers of every section.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Combined magnitude response at `frequency` Hz.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        self.sections
            .iter()
            .map(|s| s.magnitude_at(frequency, sample_rate))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::BUTTERWORTH_Q;
    use crate::math::linear_to_db;

    #[test]
    fn recompute_only_on_meaningful_change() {
        let mut cascade = FilterCascade::new();
        assert!(cascade.configure(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q, 48000.0));
        assert!(!cascade.configure(FilterKind::Lowpass, 1000.005, BUTTERWORTH_Q, 48000.0));
        assert!(!cascade.configure(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q + 0.005, 48000.0));
        assert!(cascade.configure(FilterKind::Lowpass, 1000.5, BUTTERWORTH_Q, 48000.0));
        assert!(cascade.configure(FilterKind::Lowpass, 1000.5, BUTTERWORTH_Q, 96000.0));
        assert!(cascade.configure(FilterKind::Highpass, 1000.5, BUTTERWORTH_Q, 96000.0));
    }

    #[test]
    fn sixth_order_slope() {
        let sample_rate = 48000.0;
        let mut cascade = FilterCascade::new();
        cascade.configure(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q, sample_rate);

        let one_octave = linear_to_db(cascade.magnitude_at(2000.0, sample_rate));
        let two_octaves = linear_to_db(cascade.magnitude_at(4000.0, sample_rate));
        let slope = one_octave - two_octaves;
        assert!(
            (slope - 36.0).abs() < 4.0,
            "Expected ~36 dB/octave, got {slope} dB between 2 kHz and 4 kHz"
        );
    }

    #[test]
    fn configure_preserves_state() {
        let mut cascade = FilterCascade::new();
        cascade.configure(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q, 48000.0);
        for _ in 0..2000 {
            cascade.process(1.0);
        }

        // Retuning must not reset the registers (no click)
        cascade.configure(FilterKind::Lowpass, 1200.0, BUTTERWORTH_Q, 48000.0);
        let y = cascade.process(1.0);
        assert!((y - 1.0).abs() < 0.05, "Settled DC should survive retune, got {y}");
    }

    #[test]
    fn reset_returns_to_silence() {
        let mut cascade = FilterCascade::new();
        cascade.configure(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q, 48000.0);
        for _ in 0..100 {
            cascade.process(1.0);
        }
        cascade.reset();
        assert_eq!(cascade.process(0.0), 0.0);
    }
}
