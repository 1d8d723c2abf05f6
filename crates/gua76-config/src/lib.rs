//! Configuration and presets for the gua76 limiter.
//!
//! - [`EngineConfig`]: TOML form of [`ProcessorConfig`](gua76_dynamics::ProcessorConfig)
//! - [`Preset`]: named control snapshot keyed by control identifiers
//! - [`validation`]: range checks run before anything reaches the processor
//! - [`factory_presets`]: built-in presets, embedded at compile time
//!
//! Everything parses from and serializes to strings; reading and writing
//! files is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use gua76_config::{EngineConfig, get_factory_preset};
//! use gua76_dynamics::BlockInput;
//!
//! let mut limiter = EngineConfig::from_toml("sample_rate = 44100.0")?.build()?;
//! limiter.activate();
//!
//! let controls = get_factory_preset("vocal_leveler")?.to_controls()?;
//! let input = [0.3f32; 64];
//! let (mut left, mut right) = ([0.0f32; 64], [0.0f32; 64]);
//! limiter.run(&controls, BlockInput::new(&input, &input), &mut left, &mut right);
//! # Ok::<(), gua76_config::ConfigError>(())
//! ```

mod engine;
mod error;
mod preset;

/// Range checks for presets and engine configuration.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use engine::{EngineConfig, TuningConfig};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use preset::{ControlValue, Preset};
pub use validation::{
    ValidationError, ValidationResult, validate_control, validate_controls, validate_tuning,
};
