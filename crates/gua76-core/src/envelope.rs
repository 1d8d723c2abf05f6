//! Program-dependent peak envelope detector.
//!
//! Models the detector of a FET limiter: attack and release come from knob
//! positions through a square-law taper, and the attack gets faster the
//! further the incoming peak jumps above the current envelope.
//!
//! ```text
//! level = |x|
//! level > env : s   = 1 + k · (clamp(level / env, 1, 8) − 1)
//!               env += (1 − exp(−s / (fs · τa))) · (level − env)
//! otherwise   : env += αr · (level − env)
//! env = max(env, ENVELOPE_FLOOR)
//! ```

use libm::expf;

use crate::math::smoothing_coefficient;

/// Smallest envelope value; keeps later divisions and logarithms defined.
pub const ENVELOPE_FLOOR: f32 = 1e-6;

/// Upper bound on `level / envelope` used for the program-dependent speed-up.
const MAX_LEVEL_RATIO: f32 = 8.0;

/// Fastest/slowest time range addressed by a normalized knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    /// Time at knob position 0, in seconds.
    pub fastest_s: f32,
    /// Time at knob position 1, in seconds.
    pub slowest_s: f32,
}

impl TimeRange {
    /// Classic FET attack range: 20 µs to 800 µs.
    pub const ATTACK: Self = Self {
        fastest_s: 20e-6,
        slowest_s: 800e-6,
    };

    /// Classic FET release range: 50 ms to 1.1 s.
    pub const RELEASE: Self = Self {
        fastest_s: 0.05,
        slowest_s: 1.1,
    };

    /// Maps a knob position in `[0, 1]` to a time in seconds.
    ///
    /// `time = fastest + (slowest − fastest) · position²`
    #[inline]
    pub fn time_at(&self, position: f32) -> f32 {
        let p = if position.is_finite() { position.clamp(0.0, 1.0) } else { 0.0 };
        self.fastest_s + (self.slowest_s - self.fastest_s) * p * p
    }
}

/// Peak envelope detector with signal-dependent attack.
///
/// # Example
///
/// ```rust
/// use gua76_core::EnvelopeDetector;
///
/// let mut detector = EnvelopeDetector::new(48000.0);
/// detector.set_times(100e-6, 0.1);
///
/// let mut env = 0.0;
/// for _ in 0..100 {
///     env = detector.process(0.5);
/// }
/// assert!((env - 0.5).abs() < 0.005);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeDetector {
    /// Current envelope level (linear, ≥ ENVELOPE_FLOOR)
    envelope: f32,
    sample_rate: f32,
    attack_s: f32,
    release_s: f32,
    /// Nominal attack coefficient
    attack_coeff: f32,
    /// Release coefficient
    release_coeff: f32,
    /// `1 / (fs · τa)`, the exponent scale for the program-dependent attack
    attack_rate: f32,
    /// Speed-up per unit of `level / envelope` above 1
    program_dependency: f32,
}

impl EnvelopeDetector {
    /// Default program-dependency amount.
    pub const DEFAULT_PROGRAM_DEPENDENCY: f32 = 0.5;

    /// Creates a detector with the fastest attack and release.
    pub fn new(sample_rate: f32) -> Self {
        let mut detector = Self {
            envelope: ENVELOPE_FLOOR,
            sample_rate,
            attack_s: TimeRange::ATTACK.fastest_s,
            release_s: TimeRange::RELEASE.fastest_s,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            attack_rate: 0.0,
            program_dependency: Self::DEFAULT_PROGRAM_DEPENDENCY,
        };
        detector.recalculate_coefficients();
        detector
    }

    /// Sets the attack and release time constants in seconds.
    ///
    /// Coefficients are only recomputed when a value actually changed.
    pub fn set_times(&mut self, attack_s: f32, release_s: f32) {
        let attack_s = attack_s.max(1e-6);
        let release_s = release_s.max(1e-4);
        if attack_s != self.attack_s || release_s != self.release_s {
            self.attack_s = attack_s;
            self.release_s = release_s;
            self.recalculate_coefficients();
        }
    }

    /// Updates the sample rate the detector is clocked at.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.recalculate_coefficients();
        }
    }

    /// Sets how strongly louder transients shorten the attack (0 = fixed attack).
    pub fn set_program_dependency(&mut self, amount: f32) {
        self.program_dependency = amount.max(0.0);
    }

    /// Nominal attack coefficient (without program-dependent speed-up).
    #[inline]
    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    /// Release coefficient.
    #[inline]
    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Rectifies `input` and advances the envelope by one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();

        let coeff = if level > self.envelope {
            let ratio = (level / self.envelope).min(MAX_LEVEL_RATIO);
            let speed = 1.0 + self.program_dependency * (ratio - 1.0);
            1.0 - expf(-speed * self.attack_rate)
        } else {
            self.release_coeff
        };

        self.envelope = (self.envelope + coeff * (level - self.envelope)).max(ENVELOPE_FLOOR);
        self.envelope
    }

    /// Current envelope without advancing.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Returns the envelope to the floor.
    pub fn reset(&mut self) {
        self.envelope = ENVELOPE_FLOOR;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = smoothing_coefficient(self.attack_s, self.sample_rate);
        self.release_coeff = smoothing_coefficient(self.release_s, self.sample_rate);
        self.attack_rate = if self.sample_rate > 0.0 {
            1.0 / (self.sample_rate * self.attack_s)
        } else {
            f32::INFINITY
        };
    }
}

impl Default for EnvelopeDetector {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
