//! gua76 Core - DSP primitives for a FET-style peak limiter
//!
//! The building blocks the `gua76-dynamics` processor is assembled from.
//! Everything here is allocation-free in the audio path and runs without
//! `std`.
//!
//! # Filters
//!
//! - [`Biquad`] - RBJ lowpass/highpass section in transposed direct form II
//! - [`FilterCascade`] - Three identical sections for a steep 36 dB/oct slope
//!
//! # Dynamics
//!
//! - [`EnvelopeDetector`] - Peak detector with program-dependent attack
//! - [`TimeRange`] - Square-law knob taper for attack and release
//! - [`saturate`] - Soft clipper with drive-dependent knee
//!
//! # Anti-Aliasing
//!
//! - [`Oversampler`] - 4x/8x block oversampler for signal and sidechain
//!
//! # Stereo, Metering, Parameters
//!
//! - [`encode_mid_side`] / [`decode_mid_side`] - Mid/Side matrix
//! - [`PeakMeter`], [`GainReductionMeter`], [`RmsMeter`] - Block-rate meters
//! - [`SmoothedParam`] - One-pole glide for gain knobs
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! gua76-core = { version = "0.1", default-features = false }
//! ```
//!
//! The oversampler allocates its scratch buffers once at construction
//! through `alloc`.
//!
//! # Example
//!
//! ```rust
//! use gua76_core::{FilterCascade, FilterKind, BUTTERWORTH_Q};
//!
//! let mut hpf = FilterCascade::new();
//! hpf.configure(FilterKind::Highpass, 100.0, BUTTERWORTH_Q, 48000.0);
//!
//! let mut block = [1.0f32; 4800];
//! hpf.process_block(&mut block);
//! assert!(block[4799].abs() < 1e-3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod biquad;
pub mod cascade;
pub mod envelope;
pub mod math;
pub mod meter;
pub mod oversample;
pub mod param;
pub mod saturate;
pub mod stereo;

pub use biquad::{
    BUTTERWORTH_Q, Biquad, FilterKind, MAX_CUTOFF_RATIO, MIN_CUTOFF_HZ, MIN_Q,
    highpass_coefficients, lowpass_coefficients,
};
pub use cascade::{CASCADE_SECTIONS, FilterCascade};
pub use envelope::{ENVELOPE_FLOOR, EnvelopeDetector, TimeRange};
pub use math::{
    METER_FLOOR_DB, block_coefficient, db_to_linear, flush_denormal, linear_to_db, meter_db,
    smoothing_coefficient,
};
pub use meter::{GainReductionMeter, PeakMeter, RmsMeter, block_peak, update_peak};
pub use oversample::{MAX_OVERSAMPLE_FACTOR, OversampleFactor, OversampledBlock, Oversampler};
pub use param::{GAIN_SMOOTHING_MS, SmoothedParam};
pub use saturate::{MAX_DRIVE, saturate, saturate_block, saturation_threshold};
pub use stereo::{decode_mid_side, decode_mid_side_block, encode_mid_side, encode_mid_side_block};
