//! Biquad (bi-quadratic) filter section.
//!
//! A second-order IIR section configured as a low-pass or high-pass with
//! RBJ Audio EQ Cookbook coefficients. Shared by the sidechain conditioning
//! filters and the oversampling anti-alias filters.

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf};

use crate::math::flush_denormal;

/// Lowest cutoff accepted by coefficient calculation, in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1.0;

/// Lowest Q accepted by coefficient calculation.
pub const MIN_Q: f32 = 0.1;

/// Highest cutoff as a fraction of the sample rate.
///
/// Keeps `ω` below π so the section stays stable.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Butterworth Q for a maximally flat second-order section.
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Response shape of a [`Biquad`] section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// 12 dB/octave low-pass.
    Lowpass,
    /// 12 dB/octave high-pass.
    Highpass,
}

/// Second-order IIR section.
///
/// Implements the transposed Direct Form II structure:
/// ```text
/// y[n]  = b0*x[n] + z1
/// z1'   = b1*x[n] - a1*y[n] + z2
/// z2'   = b2*x[n] - a2*y[n]
/// ```
///
/// Coefficients are normalized so `a0 == 1`. The two state registers
/// persist across blocks and are only cleared by [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Feedforward coefficients
    b0: f32,
    b1: f32,
    b2: f32,

    /// Feedback coefficients (a0 normalized away)
    a1: f32,
    a2: f32,

    /// State registers
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Computes and installs coefficients for `kind` at `cutoff_hz` / `q`.
    ///
    /// Never fails: `cutoff_hz` is clamped to at least [`MIN_CUTOFF_HZ`]
    /// (and below Nyquist), `q` to at least [`MIN_Q`]. State registers are
    /// left untouched.
    pub fn set_coefficients(&mut self, kind: FilterKind, cutoff_hz: f32, q: f32, sample_rate: f32) {
        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::Lowpass => lowpass_coefficients(cutoff_hz, q, sample_rate),
            FilterKind::Highpass => highpass_coefficients(cutoff_hz, q, sample_rate),
        };
        self.set_raw_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Installs raw coefficients, normalizing by `a0`.
    pub fn set_raw_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample through the section.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.z1;
        self.z1 = flush_denormal(self.b1 * input - self.a1 * output + self.z2);
        self.z2 = flush_denormal(self.b2 * input - self.a2 * output);
        output
    }

    /// Clears the state registers without changing coefficients.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Magnitude of the frequency response at `frequency` Hz.
    ///
    /// Evaluates `|H(e^jω)|` from the installed coefficients.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * PI * frequency / sample_rate;
        let (c1, s1) = (cosf(omega), sinf(omega));
        let (c2, s2) = (cosf(2.0 * omega), sinf(2.0 * omega));

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        sqrtf(num_re * num_re + num_im * num_im) / sqrtf(den_re * den_re + den_im * den_im)
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps cutoff and Q into the range where the cookbook formulas are defined.
#[inline]
fn sanitize(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let max_cutoff = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
    let frequency = if frequency.is_finite() { frequency } else { max_cutoff };
    let q = if q.is_finite() { q } else { BUTTERWORTH_Q };
    (frequency.clamp(MIN_CUTOFF_HZ, max_cutoff), q.max(MIN_Q))
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `frequency` - Cutoff frequency in Hz (clamped to at least 1 Hz)
/// * `q` - Q factor (clamped to at least 0.1; 0.707 for Butterworth)
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (frequency, q) = sanitize(frequency, q, sample_rate);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
///
/// Same clamping rules as [`lowpass_coefficients`].
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn highpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (frequency, q) = sanitize(frequency, q, sample_rate);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linear_to_db;

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();

        for i in 0..10 {
            let input = i as f32 * 0.1;
            let output = biquad.process(input);
            assert!((output - input).abs() < 0.0001);
        }
    }

    #[test]
    fn test_biquad_reset_keeps_coefficients() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(FilterKind::Lowpass, 1000.0, BUTTERWORTH_Q, 48000.0);

        for _ in 0..10 {
            biquad.process(1.0);
        }
        let b0 = biquad.b0;

        biquad.reset();

        assert_eq!(biquad.z1, 0.0);
        assert_eq!(biquad.z2, 0.0);
        assert_eq!(biquad.b0, b0);
    }

    #[test]
    fn test_lowpass_minus_3db_at_cutoff() {
        let sample_rate = 48000.0;
        let mut biquad = Biquad::new();
        biquad.set_coefficients(FilterKind::Lowpass, sample_rate / 4.0, 0.707, sample_rate);

        let db = linear_to_db(biquad.magnitude_at(sample_rate / 4.0, sample_rate));
        assert!((db + 3.0).abs() < 0.5, "Expected ~-3 dB at cutoff, got {db}");
    }

    #[test]
    fn test_biquad_lowpass_dc_pass() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(FilterKind::Lowpass, 1000.0, 0.707, 44100.0);

        let mut output = 0.0;
        for _ in 0..1000 {
            output = biquad.process(1.0);
        }

        assert!((output - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_biquad_highpass_blocks_dc() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(FilterKind::Highpass, 100.0, 0.707, 48000.0);

        let mut output = 1.0;
        for _ in 0..20000 {
            output = biquad.process(1.0);
        }

        assert!(output.abs() < 1e-3, "High-pass should reject DC, got {output}");
    }

    #[test]
    fn test_degenerate_parameters_are_clamped() {
        let cases = [
            (0.0, 0.707),
            (-50.0, 0.707),
            (1000.0, 0.0),
            (1000.0, -1.0),
            (f32::NAN, f32::NAN),
        ];
        for (freq, q) in cases {
            let (b0, b1, b2, a0, a1, a2) = lowpass_coefficients(freq, q, 48000.0);
            for c in [b0, b1, b2, a0, a1, a2] {
                assert!(c.is_finite(), "freq={freq} q={q} produced {c}");
            }
            assert!(a0 > 0.0);
        }
    }

    #[test]
    fn test_cutoff_above_nyquist_stays_stable() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(FilterKind::Lowpass, 96000.0, 0.707, 48000.0);

        let mut peak = 0.0f32;
        for i in 0..4096 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            peak = peak.max(biquad.process(x).abs());
        }
        assert!(peak.is_finite() && peak < 10.0);
    }
}
