//! gua76 Dynamics - FET-style stereo peak limiter
//!
//! The limiter assembled from `gua76-core` primitives:
//!
//! - [`FetLimiter`] - The block pipeline (`new` → `activate` → `run`)
//! - [`Controls`] - Per-block control snapshot, decoded from the port array
//! - [`Ratio`] / [`GainComputer`] - Ratio buttons and the static gain law
//! - [`CompressorChannel`] - Sidechain filters, detector and gain state of one chain
//! - [`MeterBank`] / [`MeterReadings`] - Peak, gain-reduction and RMS meters
//! - [`ProcessorConfig`] / [`DynamicsTuning`] - Construction-time settings
//!
//! ## Example
//!
//! ```rust
//! use gua76_dynamics::{BlockInput, ControlPort, Controls, FetLimiter, ProcessorConfig};
//!
//! let mut limiter = FetLimiter::new(ProcessorConfig::new(44100.0))?;
//! limiter.activate();
//!
//! let mut ports = Controls::default_ports();
//! ports[ControlPort::Ratio.index()] = 4.0; // all buttons
//! ports[ControlPort::Drive.index()] = 0.6;
//!
//! let input = [0.5f32; 128];
//! let (mut left, mut right) = ([0.0f32; 128], [0.0f32; 128]);
//! let meters = limiter.run_ports(&ports, BlockInput::new(&input, &input), &mut left, &mut right);
//! assert_eq!(meters.len(), gua76_dynamics::METER_COUNT);
//! # Ok::<(), gua76_dynamics::SetupError>(())
//! ```
//!
//! ## Logging
//!
//! Enable the `tracing` feature to get construction, activation, filter
//! refresh and capacity-fallback events. Nothing is logged per sample.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod config;
pub mod controls;
pub mod gain;
pub mod meters;
pub mod processor;

pub use channel::{CompressorChannel, DetectorTiming, SidechainFilters};
pub use config::{DEFAULT_MAX_BLOCK_SIZE, DynamicsTuning, ProcessorConfig, SetupError};
pub use controls::{
    CONTROL_COUNT, ControlDescriptor, ControlPort, ControlUnit, Controls, METER_COUNT, MeterMode,
    MeterPort, MeterReadings,
};
pub use gain::{GainComputer, Ratio};
pub use gua76_core::OversampleFactor;
pub use meters::MeterBank;
pub use processor::{BlockInput, FetLimiter};
