//! Block oversampling engine for the nonlinear dynamics stage.
//!
//! Gain computation and saturation are nonlinear: they generate harmonics
//! that would alias back into the audible band at the host rate. The
//! engine runs that stage at N× the host rate:
//!
//! 1. **Stage**: the caller writes one host-rate block into the scratch buffers
//! 2. **Upsample**: linear interpolation to N× in place, then a 6th-order
//!    Butterworth low-pass on the program signal to remove interpolation images
//! 3. **Process**: the caller runs the dynamics stage over `len · N` samples
//! 4. **Downsample**: the same low-pass again, then keep every Nth sample
//!
//! ```text
//! stage → interpolate ×N → LPF (3 biquads) → dynamics @ N·fs → LPF (3 biquads) → decimate ÷N
//! ```
//!
//! All four scratch buffers (signal L/R, sidechain L/R) are allocated once in
//! [`Oversampler::new`]. A block longer than the configured maximum is
//! refused by [`Oversampler::stage`] and the caller processes it at host rate.

use alloc::vec;
use alloc::vec::Vec;

use crate::biquad::{BUTTERWORTH_Q, FilterKind};
use crate::cascade::FilterCascade;

/// Maximum supported oversampling factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 8;

/// Oversampling ratio, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversampleFactor {
    /// 4× the host rate.
    X4,
    /// 8× the host rate.
    #[default]
    X8,
}

impl OversampleFactor {
    /// Ratio as an integer.
    pub const fn as_usize(self) -> usize {
        match self {
            Self::X4 => 4,
            Self::X8 => 8,
        }
    }

    /// Parses 4 or 8; anything else is unsupported.
    pub const fn from_usize(factor: usize) -> Option<Self> {
        match factor {
            4 => Some(Self::X4),
            8 => Some(Self::X8),
            _ => None,
        }
    }
}

/// Length of each scratch buffer, or `None` if it does not fit in `usize`.
pub fn scratch_len(max_block_size: usize, factor: OversampleFactor) -> Option<usize> {
    max_block_size.checked_mul(factor.as_usize())
}

/// Linear interpolation from `input` into `output` at `factor`×.
///
/// Sample `i` produces `factor` points running from `input[i]` toward
/// `input[i + 1]`; the last input sample has no successor and is repeated.
/// Writes `input.len() * factor` samples (truncated to `output.len()`).
pub fn interpolate(input: &[f32], output: &mut [f32], factor: usize) {
    let factor = factor.max(1);
    let step = 1.0 / factor as f32;
    let len = input.len().min(output.len() / factor);

    for i in 0..len {
        let current = input[i];
        let next = if i + 1 < input.len() { input[i + 1] } else { current };
        let delta = next - current;
        for (k, out) in output[i * factor..(i + 1) * factor].iter_mut().enumerate() {
            *out = current + delta * (k as f32 * step);
        }
    }
}

/// In-place variant of [`interpolate`].
///
/// `buffer[..len]` holds the host-rate samples; on return
/// `buffer[..len * factor]` holds the interpolated stream. Expansion runs
/// back to front so no source sample is overwritten before it is read.
pub fn interpolate_in_place(buffer: &mut [f32], len: usize, factor: usize) {
    let factor = factor.max(1);
    let len = len.min(buffer.len() / factor);
    if len == 0 || factor == 1 {
        return;
    }
    let step = 1.0 / factor as f32;

    for i in (0..len).rev() {
        let current = buffer[i];
        let next = if i + 1 < len { buffer[i + 1] } else { current };
        let delta = next - current;
        for k in (0..factor).rev() {
            buffer[i * factor + k] = current + delta * (k as f32 * step);
        }
    }
}

/// Keeps every `factor`-th sample of `input`, starting at index 0.
///
/// Writes `input.len() / factor` samples (truncated to `output.len()`).
pub fn decimate(input: &[f32], output: &mut [f32], factor: usize) {
    let factor = factor.max(1);
    for (out, &sample) in output.iter_mut().zip(input.iter().step_by(factor)) {
        *out = sample;
    }
}

/// Mutable view over the four scratch buffers for one block.
pub struct OversampledBlock<'a> {
    /// Program signal, left (or mid) chain.
    pub signal_left: &'a mut [f32],
    /// Program signal, right (or side) chain.
    pub signal_right: &'a mut [f32],
    /// Detector signal, left (or mid) chain.
    pub sidechain_left: &'a mut [f32],
    /// Detector signal, right (or side) chain.
    pub sidechain_right: &'a mut [f32],
}

/// Block oversampling engine with pre-allocated scratch buffers.
///
/// # Example
///
/// ```rust
/// use gua76_core::{OversampleFactor, Oversampler};
///
/// let mut os = Oversampler::new(OversampleFactor::X4, 48000.0, 64);
/// let input = [0.5f32; 64];
/// let mut out_l = [0.0f32; 64];
/// let mut out_r = [0.0f32; 64];
///
/// if let Some(block) = os.stage(input.len()) {
///     block.signal_left.copy_from_slice(&input);
///     block.signal_right.copy_from_slice(&input);
///     block.sidechain_left.copy_from_slice(&input);
///     block.sidechain_right.copy_from_slice(&input);
/// }
/// let block = os.upsample(input.len());
/// assert_eq!(block.signal_left.len(), 256);
/// // ... nonlinear processing at 192 kHz ...
/// os.downsample(input.len(), &mut out_l, &mut out_r);
/// ```
#[derive(Debug, Clone)]
pub struct Oversampler {
    factor: OversampleFactor,
    /// Host sample rate
    sample_rate: f32,
    /// Largest host block the scratch buffers can hold
    max_block_size: usize,
    signal: [Vec<f32>; 2],
    sidechain: [Vec<f32>; 2],
    upsample_filters: [FilterCascade; 2],
    downsample_filters: [FilterCascade; 2],
    /// Blocks refused for exceeding capacity since construction
    overflow_blocks: u64,
}

impl Oversampler {
    /// Allocates the scratch buffers and tunes the anti-alias filters.
    ///
    /// The anti-alias cutoff is the host Nyquist frequency (the oversampled
    /// Nyquist ÷ N), Butterworth Q.
    ///
    /// Callers validate `max_block_size * factor` with [`scratch_len`]
    /// beforehand; if the product overflows anyway, no scratch is allocated
    /// and every block falls back to host rate.
    pub fn new(factor: OversampleFactor, sample_rate: f32, max_block_size: usize) -> Self {
        let (max_block_size, len) = match scratch_len(max_block_size, factor) {
            Some(len) => (max_block_size, len),
            None => (0, 0),
        };
        let mut engine = Self {
            factor,
            sample_rate,
            max_block_size,
            signal: [vec![0.0; len], vec![0.0; len]],
            sidechain: [vec![0.0; len], vec![0.0; len]],
            upsample_filters: [FilterCascade::new(), FilterCascade::new()],
            downsample_filters: [FilterCascade::new(), FilterCascade::new()],
            overflow_blocks: 0,
        };
        engine.configure_filters();
        engine
    }

    fn configure_filters(&mut self) {
        let rate = self.oversampled_rate();
        let cutoff = self.sample_rate * 0.5;
        for cascade in self
            .upsample_filters
            .iter_mut()
            .chain(self.downsample_filters.iter_mut())
        {
            cascade.configure(FilterKind::Lowpass, cutoff, BUTTERWORTH_Q, rate);
        }
    }

    /// Oversampling ratio.
    pub fn factor(&self) -> OversampleFactor {
        self.factor
    }

    /// Host sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Sample rate the dynamics stage runs at while oversampling.
    pub fn oversampled_rate(&self) -> f32 {
        self.sample_rate * self.factor.as_usize() as f32
    }

    /// Largest host block that can be oversampled.
    pub fn capacity(&self) -> usize {
        self.max_block_size
    }

    /// Whether a host block of `len` samples fits the scratch buffers.
    pub fn fits(&self, len: usize) -> bool {
        len <= self.max_block_size
    }

    /// Number of blocks refused for exceeding capacity.
    pub fn overflow_blocks(&self) -> u64 {
        self.overflow_blocks
    }

    /// Returns the first `len` slots of each scratch buffer for staging a
    /// host-rate block.
    ///
    /// Returns `None` when `len` exceeds [`capacity`](Self::capacity); the
    /// first such block is logged, later ones are only counted.
    pub fn stage(&mut self, len: usize) -> Option<OversampledBlock<'_>> {
        if !self.fits(len) {
            self.overflow_blocks = self.overflow_blocks.saturating_add(1);
            #[cfg(feature = "tracing")]
            if self.overflow_blocks == 1 {
                tracing::warn!(
                    block_len = len,
                    capacity = self.max_block_size,
                    "oversampling skipped: block exceeds scratch capacity"
                );
            }
            return None;
        }
        Some(self.view(len))
    }

    /// Expands the staged block to N× and band-limits the program signal.
    ///
    /// Returns views of `len · N` samples. `len` is clamped to capacity.
    pub fn upsample(&mut self, len: usize) -> OversampledBlock<'_> {
        let len = len.min(self.max_block_size);
        let factor = self.factor.as_usize();

        for buffer in self.signal.iter_mut().chain(self.sidechain.iter_mut()) {
            interpolate_in_place(buffer, len, factor);
        }
        for (buffer, cascade) in self.signal.iter_mut().zip(self.upsample_filters.iter_mut()) {
            cascade.process_block(&mut buffer[..len * factor]);
        }

        self.view(len * factor)
    }

    /// Band-limits the processed program signal and decimates it into
    /// `out_left` / `out_right` (`len` host-rate samples each).
    pub fn downsample(&mut self, len: usize, out_left: &mut [f32], out_right: &mut [f32]) {
        let len = len.min(self.max_block_size);
        let factor = self.factor.as_usize();

        for (buffer, cascade) in self.signal.iter_mut().zip(self.downsample_filters.iter_mut()) {
            cascade.process_block(&mut buffer[..len * factor]);
        }

        let [left, right] = &self.signal;
        let n_left = len.min(out_left.len());
        let n_right = len.min(out_right.len());
        decimate(&left[..len * factor], &mut out_left[..n_left], factor);
        decimate(&right[..len * factor], &mut out_right[..n_right], factor);
    }

    /// Clears all anti-alias filter state.
    pub fn reset(&mut self) {
        for cascade in self
            .upsample_filters
            .iter_mut()
            .chain(self.downsample_filters.iter_mut())
        {
            cascade.reset();
        }
    }

    fn view(&mut self, len: usize) -> OversampledBlock<'_> {
        let [signal_left, signal_right] = &mut self.signal;
        let [sidechain_left, sidechain_right] = &mut self.sidechain;
        OversampledBlock {
            signal_left: &mut signal_left[..len],
            signal_right: &mut signal_right[..len],
            sidechain_left: &mut sidechain_left[..len],
            sidechain_right: &mut sidechain_right[..len],
        }
    }
}
