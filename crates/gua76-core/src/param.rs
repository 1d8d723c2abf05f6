//! Smoothed gain parameters.
//!
//! Input and output gain knobs jump in host-block steps. [`SmoothedParam`]
//! glides between the values with a one-pole filter so the gain stages
//! never click.
//!
//! ```rust
//! use gua76_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(1.0, 48000.0, 5.0);
//! gain.set_target_db(-6.0);
//!
//! let mut block = [1.0f32; 2400];
//! gain.apply_block(&mut block);
//! assert!((block[2399] - 0.501).abs() < 0.01);
//! ```

use crate::math::{db_to_linear, smoothing_coefficient};

/// Default glide time for gain stages, in milliseconds.
pub const GAIN_SMOOTHING_MS: f32 = 5.0;

/// A value that follows its target through a one-pole lowpass.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// 1.0 = instant
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Creates a parameter resting at `initial` with no smoothing.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Creates a parameter resting at `initial` that glides over `smoothing_time_ms`.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Sets the value to glide toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets the target from a level in dB.
    #[inline]
    pub fn set_target_db(&mut self, db: f32) {
        self.target = db_to_linear(db);
    }

    /// Sets target and current value together, skipping the glide.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Changes the glide time constant.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Multiplies every sample of `buffer` by the gliding value.
    pub fn apply_block(&mut self, buffer: &mut [f32]) {
        if self.is_settled() {
            self.current = self.target;
            let gain = self.current;
            buffer.iter_mut().for_each(|x| *x *= gain);
            return;
        }
        for x in buffer.iter_mut() {
            *x *= self.advance();
        }
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Value being glided toward.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the glide has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jumps to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = smoothing_coefficient(self.smoothing_time_ms / 1000.0, self.sample_rate);
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::expf;

    #[test]
    fn instant_without_smoothing() {
        let mut param = SmoothedParam::new(1.0);
        param.set_target(0.5);
        assert_eq!(param.advance(), 0.5);
    }

    #[test]
    fn one_time_constant_is_63_percent() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);
        for _ in 0..480 {
            param.advance();
        }
        let expected = 1.0 - expf(-1.0);
        assert!((param.get() - expected).abs() < 0.01, "got {}", param.get());
    }

    #[test]
    fn settled_block_is_plain_gain() {
        let mut param = SmoothedParam::with_config(0.5, 48000.0, GAIN_SMOOTHING_MS);
        let mut block = [0.8f32; 16];
        param.apply_block(&mut block);
        assert!(block.iter().all(|&x| x == 0.4));
    }

    #[test]
    fn glide_is_monotonic() {
        let mut param = SmoothedParam::with_config(1.0, 48000.0, GAIN_SMOOTHING_MS);
        param.set_target(0.0);
        let mut block = [1.0f32; 512];
        param.apply_block(&mut block);
        assert!(block.windows(2).all(|w| w[1] <= w[0]));
        assert!(block[0] < 1.0);
    }

    #[test]
    fn immediate_skips_glide() {
        let mut param = SmoothedParam::with_config(1.0, 48000.0, GAIN_SMOOTHING_MS);
        param.set_immediate(0.25);
        assert!(param.is_settled());
        assert_eq!(param.advance(), 0.25);
    }

    #[test]
    fn longer_time_glides_slower() {
        let mut fast = SmoothedParam::with_config(0.0, 48000.0, 1.0);
        let mut slow = SmoothedParam::with_config(0.0, 48000.0, 1.0);
        slow.set_smoothing_time_ms(50.0);
        fast.set_target(1.0);
        slow.set_target(1.0);
        assert!(slow.advance() < fast.advance());
    }
}
