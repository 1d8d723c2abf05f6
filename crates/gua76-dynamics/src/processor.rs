//! The FET limiter pipeline.
//!
//! # Signal Flow
//!
//! ```text
//! in ─► input gain + pad ─► [M/S encode] ─► upsample ×N ─┐
//! sc ─► input gain + pad ─► [M/S encode] ─► upsample ×N ─┤
//!                                                        ▼
//!        per sample: sidechain HPF/LPF → envelope → [link] → gain law
//!                    → smoothed gain × signal → saturator
//!                                                        │
//! out ◄─ output gain ◄─ [M/S decode] ◄─ downsample ÷N ◄──┘
//! ```
//!
//! With oversampling off, or when a block is longer than the scratch
//! capacity, the same per-sample stage runs at the host rate.
//!
//! # Real-Time Safety
//!
//! [`FetLimiter::run`] never allocates, locks or fails. Every scratch
//! buffer is sized in [`FetLimiter::new`], which is the only fallible call.

use gua76_core::{
    MAX_DRIVE, OversampledBlock, Oversampler, SmoothedParam, db_to_linear, decode_mid_side,
    encode_mid_side, saturate,
};

use crate::channel::{CompressorChannel, DetectorTiming, SidechainFilters};
use crate::config::{ProcessorConfig, SetupError};
use crate::controls::{Controls, MeterReadings};
use crate::gain::GainComputer;
use crate::meters::MeterBank;

/// Audio handed to [`FetLimiter::run`] for one block.
#[derive(Debug, Clone, Copy)]
pub struct BlockInput<'a> {
    /// Left input channel.
    pub left: &'a [f32],
    /// Right input channel.
    pub right: &'a [f32],
    /// External sidechain (left, right); `None` keys the detector from the input.
    pub sidechain: Option<(&'a [f32], &'a [f32])>,
}

impl<'a> BlockInput<'a> {
    /// Stereo input keyed from itself.
    pub fn new(left: &'a [f32], right: &'a [f32]) -> Self {
        Self {
            left,
            right,
            sidechain: None,
        }
    }

    /// Adds an external sidechain.
    pub fn with_sidechain(mut self, left: &'a [f32], right: &'a [f32]) -> Self {
        self.sidechain = Some((left, right));
        self
    }
}

/// Settings shared by every sample of a block.
#[derive(Debug, Clone, Copy)]
struct BlockSettings {
    computer: GainComputer,
    drive: f32,
    link: bool,
    listen: bool,
}

/// Stereo FET-style peak limiter.
///
/// # Example
///
/// ```rust
/// use gua76_dynamics::{BlockInput, Controls, FetLimiter, ProcessorConfig};
///
/// let mut limiter = FetLimiter::new(ProcessorConfig::new(48000.0)).unwrap();
/// limiter.activate();
///
/// let input = [0.8f32; 256];
/// let mut left = [0.0f32; 256];
/// let mut right = [0.0f32; 256];
/// let meters = limiter.run(
///     &Controls::default(),
///     BlockInput::new(&input, &input),
///     &mut left,
///     &mut right,
/// );
///
/// assert!(meters.gain_reduction_db < 0.0);
/// assert!(left.iter().all(|x| x.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct FetLimiter {
    config: ProcessorConfig,
    oversampler: Oversampler,
    channels: [CompressorChannel; 2],
    input_gain: SmoothedParam,
    output_gain: SmoothedParam,
    meters: MeterBank,
    /// Oversampling switch state of the previous block
    oversampling_on: bool,
    /// Blocks whose external sidechain was too short to use
    short_sidechain_blocks: u64,
}

impl FetLimiter {
    /// Builds a limiter and allocates all of its buffers.
    pub fn new(config: ProcessorConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let sample_rate = config.sample_rate;
        let tuning = config.tuning;

        #[cfg(feature = "tracing")]
        tracing::info!(
            sample_rate,
            max_block_size = config.max_block_size,
            oversample_factor = config.oversample_factor.as_usize(),
            "FET limiter created"
        );

        Ok(Self {
            oversampler: Oversampler::new(
                config.oversample_factor,
                sample_rate,
                config.max_block_size,
            ),
            channels: [CompressorChannel::new(sample_rate), CompressorChannel::new(sample_rate)],
            input_gain: SmoothedParam::with_config(1.0, sample_rate, tuning.gain_smoothing_ms),
            output_gain: SmoothedParam::with_config(1.0, sample_rate, tuning.gain_smoothing_ms),
            meters: MeterBank::new(sample_rate, &tuning),
            oversampling_on: false,
            short_sidechain_blocks: 0,
            config,
        })
    }

    /// Construction parameters.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Blocks that ran at host rate because they exceeded the scratch capacity.
    pub fn oversample_overflows(&self) -> u64 {
        self.oversampler.overflow_blocks()
    }

    /// Blocks whose external sidechain was shorter than the block.
    pub fn short_sidechain_blocks(&self) -> u64 {
        self.short_sidechain_blocks
    }

    /// Current smoothed gain factor of each chain.
    pub fn channel_gains(&self) -> [f32; 2] {
        [self.channels[0].gain(), self.channels[1].gain()]
    }

    /// Current envelope of each chain.
    pub fn envelopes(&self) -> [f32; 2] {
        [self.channels[0].envelope(), self.channels[1].envelope()]
    }

    /// Meter readings as of the last block.
    pub fn readings(&self, controls: &Controls) -> MeterReadings {
        self.meters.readings(controls.meter_mode)
    }

    /// Clears envelopes, gain reduction, filter registers and meters.
    pub fn activate(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("FET limiter activated");

        for channel in &mut self.channels {
            channel.reset();
        }
        self.oversampler.reset();
        self.meters.reset();
        self.input_gain.snap_to_target();
        self.output_gain.snap_to_target();
    }

    /// Processes one block.
    ///
    /// The block length is the shortest of the four main buffers; output
    /// samples past it are left untouched.
    pub fn run(
        &mut self,
        controls: &Controls,
        input: BlockInput<'_>,
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> MeterReadings {
        let len = input
            .left
            .len()
            .min(input.right.len())
            .min(out_left.len())
            .min(out_right.len());
        let (in_left, in_right) = (&input.left[..len], &input.right[..len]);
        let (out_left, out_right) = (&mut out_left[..len], &mut out_right[..len]);

        self.meters.update_input(in_left, in_right);

        if controls.bypass {
            out_left.copy_from_slice(in_left);
            out_right.copy_from_slice(in_right);
            self.meters.update_output(out_left, out_right);
            self.meters.clear_gain_reduction();
            return self.meters.readings(controls.meter_mode);
        }

        let sidechain = self.resolve_sidechain(input.sidechain, len);
        self.input_gain.set_target(db_to_linear(controls.input_level_db()));
        self.output_gain.set_target(db_to_linear(controls.output_gain_db));
        self.track_oversampling_switch(controls.oversampling);

        let settings = self.block_settings(controls);
        let frame = Frame {
            left: in_left,
            right: in_right,
            sidechain,
            mid_side: controls.mid_side,
        };

        let oversampled = controls.oversampling && self.stage_oversampled(&frame, len);
        let rate = if oversampled {
            self.oversampler.oversampled_rate()
        } else {
            self.config.sample_rate
        };
        self.configure_channels(controls, rate);

        if oversampled {
            let Self { oversampler, channels, .. } = self;
            let block = oversampler.upsample(len);
            process_oversampled(channels, &settings, block);
            oversampler.downsample(len, out_left, out_right);
        } else {
            for i in 0..len {
                let gain = self.input_gain.advance();
                let (signal, sc) = frame.at(i, gain);
                let (l, r) = process_frame(&mut self.channels, &settings, signal, sc);
                out_left[i] = l;
                out_right[i] = r;
            }
        }

        for (l, r) in out_left.iter_mut().zip(out_right.iter_mut()) {
            if controls.mid_side {
                (*l, *r) = decode_mid_side(*l, *r);
            }
            let gain = self.output_gain.advance();
            *l *= gain;
            *r *= gain;
        }

        let min_gain = self.channels[0].take_min_gain().min(self.channels[1].take_min_gain());
        self.meters.update_gain_reduction(min_gain, len);
        self.meters.update_output(out_left, out_right);
        self.meters.readings(controls.meter_mode)
    }

    /// Decodes a raw control array and processes one block.
    pub fn run_ports(
        &mut self,
        ports: &[f32; crate::CONTROL_COUNT],
        input: BlockInput<'_>,
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> [f32; crate::METER_COUNT] {
        let controls = Controls::from_ports(ports);
        self.run(&controls, input, out_left, out_right).to_ports()
    }

    fn resolve_sidechain<'a>(
        &mut self,
        sidechain: Option<(&'a [f32], &'a [f32])>,
        len: usize,
    ) -> Option<(&'a [f32], &'a [f32])> {
        let (left, right) = sidechain?;
        if left.len() >= len && right.len() >= len {
            return Some((&left[..len], &right[..len]));
        }
        self.short_sidechain_blocks = self.short_sidechain_blocks.saturating_add(1);
        #[cfg(feature = "tracing")]
        if self.short_sidechain_blocks == 1 {
            tracing::warn!(
                block_len = len,
                sidechain_left = left.len(),
                sidechain_right = right.len(),
                "external sidechain shorter than block, keying from input"
            );
        }
        None
    }

    fn track_oversampling_switch(&mut self, on: bool) {
        if on == self.oversampling_on {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(oversampling = on, "oversampling toggled");
        if on {
            self.oversampler.reset();
        }
        self.oversampling_on = on;
    }

    fn block_settings(&self, controls: &Controls) -> BlockSettings {
        let tuning = &self.config.tuning;
        let offset = if controls.ratio.is_all_buttons() {
            tuning.all_buttons_drive_offset
        } else {
            0.0
        };
        BlockSettings {
            computer: GainComputer::for_ratio(controls.ratio, tuning),
            drive: (controls.drive + offset).clamp(0.0, MAX_DRIVE),
            link: controls.mid_side && controls.link,
            listen: controls.listen,
        }
    }

    fn configure_channels(&mut self, controls: &Controls, rate: f32) {
        let tuning = &self.config.tuning;
        let timing = DetectorTiming {
            attack_s: tuning.attack.time_at(controls.attack),
            release_s: tuning.release.time_at(controls.release),
            program_dependency: tuning.program_dependency,
        };
        let filters = SidechainFilters {
            highpass_hz: controls.hpf_enabled.then_some(controls.hpf_hz),
            lowpass_hz: controls.lpf_enabled.then_some(controls.lpf_hz),
            q: controls.sidechain_q,
        };
        for channel in &mut self.channels {
            channel.configure(&timing, &filters, rate);
        }
    }

    /// Writes the gained, optionally M/S-encoded block into the oversampler's
    /// staging buffers. Returns `false` when the block does not fit.
    fn stage_oversampled(&mut self, frame: &Frame<'_>, len: usize) -> bool {
        let Some(block) = self.oversampler.stage(len) else {
            return false;
        };
        for i in 0..len {
            let gain = self.input_gain.advance();
            let ((l, r), (sl, sr)) = frame.at(i, gain);
            block.signal_left[i] = l;
            block.signal_right[i] = r;
            block.sidechain_left[i] = sl;
            block.sidechain_right[i] = sr;
        }
        true
    }
}

/// Host-rate view of a block's inputs.
struct Frame<'a> {
    left: &'a [f32],
    right: &'a [f32],
    sidechain: Option<(&'a [f32], &'a [f32])>,
    mid_side: bool,
}

impl Frame<'_> {
    /// Gained (and M/S-encoded) program and sidechain pairs for sample `i`.
    #[inline]
    fn at(&self, i: usize, gain: f32) -> ((f32, f32), (f32, f32)) {
        let signal = (self.left[i] * gain, self.right[i] * gain);
        let sidechain = match self.sidechain {
            Some((left, right)) => (left[i] * gain, right[i] * gain),
            None => signal,
        };
        if self.mid_side {
            (
                encode_mid_side(signal.0, signal.1),
                encode_mid_side(sidechain.0, sidechain.1),
            )
        } else {
            (signal, sidechain)
        }
    }
}

fn process_oversampled(
    channels: &mut [CompressorChannel; 2],
    settings: &BlockSettings,
    block: OversampledBlock<'_>,
) {
    let samples = block
        .signal_left
        .iter_mut()
        .zip(block.signal_right.iter_mut())
        .zip(block.sidechain_left.iter().zip(block.sidechain_right.iter()));
    for ((l, r), (&sl, &sr)) in samples {
        (*l, *r) = process_frame(channels, settings, (*l, *r), (sl, sr));
    }
}

/// Dynamics stage for one stereo sample.
#[inline]
fn process_frame(
    channels: &mut [CompressorChannel; 2],
    settings: &BlockSettings,
    signal: (f32, f32),
    sidechain: (f32, f32),
) -> (f32, f32) {
    let [first, second] = channels;
    let conditioned = (first.condition(sidechain.0), second.condition(sidechain.1));
    let mut envelopes = (first.detect(conditioned.0), second.detect(conditioned.1));
    if settings.link {
        let linked = envelopes.0.max(envelopes.1);
        envelopes = (linked, linked);
    }

    let compressed = (
        first.apply(signal.0, envelopes.0, &settings.computer),
        second.apply(signal.1, envelopes.1, &settings.computer),
    );
    if settings.listen {
        return conditioned;
    }
    (
        saturate(compressed.0, settings.drive),
        saturate(compressed.1, settings.drive),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ratio;

    fn limiter() -> FetLimiter {
        let mut limiter = FetLimiter::new(ProcessorConfig::new(48000.0)).unwrap();
        limiter.activate();
        limiter
    }

    #[test]
    fn zero_length_block_is_harmless() {
        let mut limiter = limiter();
        let readings =
            limiter.run(&Controls::default(), BlockInput::new(&[], &[]), &mut [], &mut []);
        assert_eq!(readings.gain_reduction_db, 0.0);
    }

    #[test]
    fn mismatched_lengths_use_shortest() {
        let mut limiter = limiter();
        let left = [0.01f32; 64];
        let right = [0.01f32; 32];
        let mut out_l = [9.0f32; 64];
        let mut out_r = [9.0f32; 64];
        let controls = Controls {
            oversampling: false,
            ..Controls::default()
        };
        limiter.run(&controls, BlockInput::new(&left, &right), &mut out_l, &mut out_r);
        assert!(out_l[..32].iter().all(|&x| x == 0.01));
        assert!(out_l[32..].iter().all(|&x| x == 9.0));
    }

    #[test]
    fn short_sidechain_falls_back_to_input() {
        let mut limiter = limiter();
        let input = [0.8f32; 128];
        let sidechain = [0.0f32; 16];
        let mut out_l = [0.0f32; 128];
        let mut out_r = [0.0f32; 128];
        let controls = Controls {
            oversampling: false,
            ..Controls::default()
        };
        let block = BlockInput::new(&input, &input).with_sidechain(&sidechain, &sidechain);
        limiter.run(&controls, block, &mut out_l, &mut out_r);
        assert_eq!(limiter.short_sidechain_blocks(), 1);
        assert!(limiter.channel_gains()[0] < 1.0, "input should key the detector");
    }

    #[test]
    fn external_sidechain_keys_detector() {
        let mut limiter = limiter();
        let quiet = [0.01f32; 256];
        let loud = [0.9f32; 256];
        let mut out_l = [0.0f32; 256];
        let mut out_r = [0.0f32; 256];
        let controls = Controls {
            oversampling: false,
            ..Controls::default()
        };
        let block = BlockInput::new(&quiet, &quiet).with_sidechain(&loud, &loud);
        limiter.run(&controls, block, &mut out_l, &mut out_r);
        assert!(limiter.channel_gains()[0] < 0.5);
        assert!(out_l[255] < 0.01);
    }

    #[test]
    fn all_buttons_reduces_more_than_four_to_one() {
        let input = [0.6f32; 512];
        let mut gains = [0.0f32; 2];
        for (slot, ratio) in gains.iter_mut().zip([Ratio::Four, Ratio::AllButtons]) {
            let mut limiter = limiter();
            let controls = Controls {
                ratio,
                oversampling: false,
                ..Controls::default()
            };
            let mut out_l = [0.0f32; 512];
            let mut out_r = [0.0f32; 512];
            limiter.run(&controls, BlockInput::new(&input, &input), &mut out_l, &mut out_r);
            *slot = limiter.channel_gains()[0];
        }
        assert!(gains[1] < gains[0]);
    }

    #[test]
    fn overflow_runs_at_host_rate() {
        let config = ProcessorConfig {
            max_block_size: 64,
            ..ProcessorConfig::new(48000.0)
        };
        let mut limiter = FetLimiter::new(config).unwrap();
        limiter.activate();
        let input = vec![0.5f32; 256];
        let mut out_l = vec![0.0f32; 256];
        let mut out_r = vec![0.0f32; 256];
        limiter.run(&Controls::default(), BlockInput::new(&input, &input), &mut out_l, &mut out_r);
        limiter.run(&Controls::default(), BlockInput::new(&input, &input), &mut out_l, &mut out_r);

        assert_eq!(limiter.oversample_overflows(), 2);
        assert!(out_l.iter().all(|x| x.is_finite() && x.abs() <= 1.0));
        assert!(limiter.channel_gains()[0] < 1.0);
    }

    #[test]
    fn run_ports_matches_run() {
        let input: Vec<f32> = (0..256).map(|i| libm::sinf(i as f32 * 0.05) * 0.7).collect();
        let controls = Controls {
            ratio: Ratio::Twelve,
            ..Controls::default()
        };

        let mut a = limiter();
        let mut b = limiter();
        let (mut al, mut ar) = (vec![0.0f32; 256], vec![0.0f32; 256]);
        let (mut bl, mut br) = (vec![0.0f32; 256], vec![0.0f32; 256]);
        let readings = a.run(&controls, BlockInput::new(&input, &input), &mut al, &mut ar);
        let ports = b.run_ports(
            &controls.to_ports(),
            BlockInput::new(&input, &input),
            &mut bl,
            &mut br,
        );

        assert_eq!(al, bl);
        assert_eq!(ar, br);
        assert_eq!(readings.to_ports(), ports);
    }
}
