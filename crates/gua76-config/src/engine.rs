//! TOML form of the processor's construction-time configuration.

use gua76_core::TimeRange;
use gua76_dynamics::{DynamicsTuning, FetLimiter, OversampleFactor, ProcessorConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{
    MAX_BLOCK_SIZE_LIMIT, SAMPLE_RATE_RANGE, ValidationError, check_range, collect, validate_tuning,
};

/// Engine configuration file.
///
/// Every field is optional; missing fields take the processor defaults.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 96000.0
/// max_block_size = 512
/// oversample_factor = 4
///
/// [tuning]
/// threshold = 0.1
/// all_buttons_base_ratio = 20.0
/// release_slowest_s = 1.1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Host sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block that runs oversampled.
    pub max_block_size: usize,
    /// Oversampling ratio, 4 or 8.
    pub oversample_factor: u32,
    /// Dynamics model constants.
    pub tuning: TuningConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&ProcessorConfig::default())
    }
}

impl From<&ProcessorConfig> for EngineConfig {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
            oversample_factor: config.oversample_factor.as_usize() as u32,
            tuning: TuningConfig::from(&config.tuning),
        }
    }
}

impl EngineConfig {
    /// Parses and validates an engine config.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every field, reporting all failures at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (min_rate, max_rate) = SAMPLE_RATE_RANGE;
        let mut errors = Vec::new();
        if let Err(e) = check_range("sample_rate", self.sample_rate, min_rate, max_rate) {
            errors.push(e);
        }
        if !(1..=MAX_BLOCK_SIZE_LIMIT).contains(&self.max_block_size) {
            errors.push(ValidationError::OutOfRange {
                param: "max_block_size".to_string(),
                value: self.max_block_size as f32,
                min: 1.0,
                max: MAX_BLOCK_SIZE_LIMIT as f32,
            });
        }
        if oversample_factor(self.oversample_factor).is_none() {
            errors.push(ValidationError::UnsupportedOversampleFactor(self.oversample_factor));
        }
        match validate_tuning(&self.tuning.to_tuning()) {
            Ok(()) => {}
            Err(ValidationError::Multiple(nested)) => errors.extend(nested),
            Err(e) => errors.push(e),
        }
        collect(errors)
    }

    /// Validates and converts to a [`ProcessorConfig`].
    pub fn to_processor_config(&self) -> Result<ProcessorConfig, ConfigError> {
        self.validate()?;
        let factor = oversample_factor(self.oversample_factor)
            .ok_or(ValidationError::UnsupportedOversampleFactor(self.oversample_factor))?;
        let config = ProcessorConfig {
            sample_rate: self.sample_rate,
            max_block_size: self.max_block_size,
            oversample_factor: factor,
            tuning: self.tuning.to_tuning(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a processor from this config.
    pub fn build(&self) -> Result<FetLimiter, ConfigError> {
        Ok(FetLimiter::new(self.to_processor_config()?)?)
    }
}

fn oversample_factor(factor: u32) -> Option<OversampleFactor> {
    OversampleFactor::from_usize(usize::try_from(factor).ok()?)
}

/// Flat TOML form of [`DynamicsTuning`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct TuningConfig {
    pub threshold: f32,
    pub all_buttons_base_ratio: f32,
    pub all_buttons_ratio_multiplier: f32,
    pub all_buttons_drive_offset: f32,
    pub program_dependency: f32,
    pub attack_fastest_s: f32,
    pub attack_slowest_s: f32,
    pub release_fastest_s: f32,
    pub release_slowest_s: f32,
    pub peak_decay_s: f32,
    pub gr_meter_smoothing_s: f32,
    pub rms_meter_smoothing_s: f32,
    pub gain_smoothing_ms: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self::from(&DynamicsTuning::default())
    }
}

impl From<&DynamicsTuning> for TuningConfig {
    fn from(t: &DynamicsTuning) -> Self {
        Self {
            threshold: t.threshold,
            all_buttons_base_ratio: t.all_buttons_base_ratio,
            all_buttons_ratio_multiplier: t.all_buttons_ratio_multiplier,
            all_buttons_drive_offset: t.all_buttons_drive_offset,
            program_dependency: t.program_dependency,
            attack_fastest_s: t.attack.fastest_s,
            attack_slowest_s: t.attack.slowest_s,
            release_fastest_s: t.release.fastest_s,
            release_slowest_s: t.release.slowest_s,
            peak_decay_s: t.peak_decay_s,
            gr_meter_smoothing_s: t.gr_meter_smoothing_s,
            rms_meter_smoothing_s: t.rms_meter_smoothing_s,
            gain_smoothing_ms: t.gain_smoothing_ms,
        }
    }
}

impl TuningConfig {
    /// Converts to the processor's tuning struct.
    pub fn to_tuning(&self) -> DynamicsTuning {
        DynamicsTuning {
            threshold: self.threshold,
            all_buttons_base_ratio: self.all_buttons_base_ratio,
            all_buttons_ratio_multiplier: self.all_buttons_ratio_multiplier,
            all_buttons_drive_offset: self.all_buttons_drive_offset,
            program_dependency: self.program_dependency,
            attack: TimeRange {
                fastest_s: self.attack_fastest_s,
                slowest_s: self.attack_slowest_s,
            },
            release: TimeRange {
                fastest_s: self.release_fastest_s,
                slowest_s: self.release_slowest_s,
            },
            peak_decay_s: self.peak_decay_s,
            gr_meter_smoothing_s: self.gr_meter_smoothing_s,
            rms_meter_smoothing_s: self.rms_meter_smoothing_s,
            gain_smoothing_ms: self.gain_smoothing_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.to_processor_config().unwrap(), ProcessorConfig::default());
    }

    #[test]
    fn partial_tuning_keeps_other_defaults() {
        let config = EngineConfig::from_toml(
            r"
sample_rate = 96000.0
oversample_factor = 4

[tuning]
threshold = 0.2
",
        )
        .unwrap();
        let processor = config.to_processor_config().unwrap();
        assert_eq!(processor.sample_rate, 96000.0);
        assert_eq!(processor.oversample_factor, OversampleFactor::X4);
        assert_eq!(processor.tuning.threshold, 0.2);
        assert_eq!(processor.tuning.all_buttons_ratio(), 30.0);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = EngineConfig::from_toml("samplerate = 44100.0").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)), "got: {err}");
    }

    #[test]
    fn factor_maps_to_oversampler_factor() {
        let config = EngineConfig::from_toml("oversample_factor = 8").unwrap();
        let processor = config.to_processor_config().unwrap();
        assert_eq!(processor.oversample_factor, OversampleFactor::X8);
    }

    #[test]
    fn bad_factor_rejected() {
        let err = EngineConfig::from_toml("oversample_factor = 2").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::UnsupportedOversampleFactor(2))
        ));
    }

    #[test]
    fn all_problems_reported_together() {
        let config = EngineConfig {
            sample_rate: 0.0,
            max_block_size: 0,
            oversample_factor: 16,
            ..EngineConfig::default()
        };
        let Err(ValidationError::Multiple(errors)) = config.validate() else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn toml_roundtrip() {
        let config = EngineConfig {
            sample_rate: 44100.0,
            max_block_size: 256,
            ..EngineConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn builds_a_processor() {
        let limiter = EngineConfig::default().build().unwrap();
        assert_eq!(limiter.config().sample_rate, 48000.0);
    }
}
