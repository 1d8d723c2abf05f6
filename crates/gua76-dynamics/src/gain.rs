//! Ratio selection and the static gain law.
//!
//! ```text
//! env ≤ T : g = 1
//! env > T : g = (T + (env − T) / ratio) / env        (g ≤ 1)
//! ```

use gua76_core::ENVELOPE_FLOOR;

use crate::config::DynamicsTuning;

/// Front-panel ratio buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ratio {
    /// 4:1
    #[default]
    Four,
    /// 8:1
    Eight,
    /// 12:1
    Twelve,
    /// 20:1
    Twenty,
    /// All four buttons pressed together.
    AllButtons,
}

impl Ratio {
    /// Every ratio, in selector order.
    pub const ALL: [Self; 5] = [
        Self::Four,
        Self::Eight,
        Self::Twelve,
        Self::Twenty,
        Self::AllButtons,
    ];

    /// Decodes a selector value, rounding to the nearest entry and clamping
    /// out-of-range values to the ends. NaN selects 4:1.
    ///
    /// ```rust
    /// use gua76_dynamics::Ratio;
    ///
    /// assert_eq!(Ratio::from_selector(1.4), Ratio::Eight);
    /// assert_eq!(Ratio::from_selector(99.0), Ratio::AllButtons);
    /// assert_eq!(Ratio::from_selector(-3.0), Ratio::Four);
    /// ```
    pub fn from_selector(value: f32) -> Self {
        if value.is_nan() {
            return Self::Four;
        }
        let index = libm::roundf(value).clamp(0.0, (Self::ALL.len() - 1) as f32) as usize;
        Self::ALL[index]
    }

    /// Position on the selector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Fixed ratio, or `None` for all-buttons (which is tuned).
    pub fn nominal(self) -> Option<f32> {
        match self {
            Self::Four => Some(4.0),
            Self::Eight => Some(8.0),
            Self::Twelve => Some(12.0),
            Self::Twenty => Some(20.0),
            Self::AllButtons => None,
        }
    }

    /// Ratio actually applied by the gain computer.
    pub fn effective(self, tuning: &DynamicsTuning) -> f32 {
        self.nominal().unwrap_or_else(|| tuning.all_buttons_ratio())
    }

    /// Whether this is the all-buttons mode.
    pub fn is_all_buttons(self) -> bool {
        self == Self::AllButtons
    }

    /// Front-panel label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Four => "4:1",
            Self::Eight => "8:1",
            Self::Twelve => "12:1",
            Self::Twenty => "20:1",
            Self::AllButtons => "all",
        }
    }
}

/// Maps a detector envelope to a gain factor in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    threshold: f32,
    ratio: f32,
}

impl GainComputer {
    /// Creates a computer with a linear `threshold` and `ratio` (clamped to ≥ 1).
    pub fn new(threshold: f32, ratio: f32) -> Self {
        Self {
            threshold: threshold.max(ENVELOPE_FLOOR),
            ratio: ratio.max(1.0),
        }
    }

    /// Computer for a front-panel ratio under `tuning`.
    pub fn for_ratio(ratio: Ratio, tuning: &DynamicsTuning) -> Self {
        Self::new(tuning.threshold, ratio.effective(tuning))
    }

    /// Linear threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Applied ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Gain factor for a detector envelope.
    ///
    /// ```rust
    /// use gua76_dynamics::GainComputer;
    ///
    /// let computer = GainComputer::new(0.1, 4.0);
    /// assert_eq!(computer.gain(0.05), 1.0);
    /// assert!((computer.gain(0.5) - 0.4).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn gain(&self, envelope: f32) -> f32 {
        if envelope <= self.threshold {
            return 1.0;
        }
        let overshoot = envelope - self.threshold;
        let compressed = self.threshold + overshoot / self.ratio;
        (compressed / envelope).min(1.0)
    }

    /// Steady-state output level for a settled envelope (`envelope × gain`).
    pub fn output_level(&self, envelope: f32) -> f32 {
        envelope * self.gain(envelope)
    }
}
