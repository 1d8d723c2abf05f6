//! Range checks for presets and engine configuration.
//!
//! The processor itself never rejects a control value: it clamps. These
//! checks run on serialized input instead, so a preset with a typo or an
//! out-of-range knob is reported rather than silently altered.
//!
//! # Example
//!
//! ```rust
//! use gua76_config::{validate_control, ValidationError};
//!
//! assert!(validate_control("drive", 0.4).is_ok());
//! assert!(matches!(
//!     validate_control("drive", 3.0),
//!     Err(ValidationError::OutOfRange { .. })
//! ));
//! assert!(matches!(
//!     validate_control("makeup", 1.0),
//!     Err(ValidationError::UnknownControl(_))
//! ));
//! ```

use gua76_core::TimeRange;
use gua76_dynamics::{ControlPort, DynamicsTuning};
use thiserror::Error;

/// Slowest and fastest host rates an engine config may request.
pub const SAMPLE_RATE_RANGE: (f32, f32) = (8000.0, 768_000.0);

/// Largest host block an engine config may request.
pub const MAX_BLOCK_SIZE_LIMIT: usize = 65536;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Preset key that names no control.
    #[error("unknown control: {0}")]
    UnknownControl(String),

    /// Value outside its documented range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Oversampling factor other than 4 or 8.
    #[error("unsupported oversampling factor {0} (expected 4 or 8)")]
    UnsupportedOversampleFactor(u32),

    /// Time range whose fastest end is slower than its slowest end.
    #[error("time range '{param}' is inverted: fastest {fastest_s} s > slowest {slowest_s} s")]
    InvertedTimeRange {
        /// Name of the range.
        param: String,
        /// Fastest time in seconds.
        fastest_s: f32,
        /// Slowest time in seconds.
        slowest_s: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Folds collected errors into a single result.
fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Checks `value` against `[min, max]`. NaN always fails.
pub fn check_range(param: &str, value: f32, min: f32, max: f32) -> ValidationResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Resolves a preset key and checks its value against the control's range.
pub fn validate_control(key: &str, value: f32) -> ValidationResult<ControlPort> {
    let port = ControlPort::from_key(key)
        .ok_or_else(|| ValidationError::UnknownControl(key.to_string()))?;
    let descriptor = port.descriptor();
    check_range(key, value, descriptor.min, descriptor.max)?;
    Ok(port)
}

/// Validates every `(key, value)` pair, reporting all failures at once.
pub fn validate_controls<'a>(
    controls: impl IntoIterator<Item = (&'a str, f32)>,
) -> ValidationResult<()> {
    let errors = controls
        .into_iter()
        .filter_map(|(key, value)| validate_control(key, value).err())
        .collect();
    collect(errors)
}

fn check_time_range(param: &str, range: &TimeRange, errors: &mut Vec<ValidationError>) {
    let before = errors.len();
    for (end, value) in [("fastest_s", range.fastest_s), ("slowest_s", range.slowest_s)] {
        if let Err(e) = check_range(&format!("{param}.{end}"), value, 1e-6, 10.0) {
            errors.push(e);
        }
    }
    if errors.len() == before && range.fastest_s > range.slowest_s {
        errors.push(ValidationError::InvertedTimeRange {
            param: param.to_string(),
            fastest_s: range.fastest_s,
            slowest_s: range.slowest_s,
        });
    }
}

/// Validates the dynamics model constants.
pub fn validate_tuning(tuning: &DynamicsTuning) -> ValidationResult<()> {
    let checks = [
        check_range("threshold", tuning.threshold, 1e-4, 1.0),
        check_range("all_buttons_base_ratio", tuning.all_buttons_base_ratio, 1.0, 1000.0),
        check_range("all_buttons_ratio_multiplier", tuning.all_buttons_ratio_multiplier, 1.0, 10.0),
        check_range(
            "all_buttons_drive_offset",
            tuning.all_buttons_drive_offset,
            0.0,
            gua76_core::MAX_DRIVE,
        ),
        check_range("program_dependency", tuning.program_dependency, 0.0, 4.0),
        check_range("peak_decay_s", tuning.peak_decay_s, 1e-3, 10.0),
        check_range("gr_meter_smoothing_s", tuning.gr_meter_smoothing_s, 1e-4, 10.0),
        check_range("rms_meter_smoothing_s", tuning.rms_meter_smoothing_s, 1e-4, 10.0),
        check_range("gain_smoothing_ms", tuning.gain_smoothing_ms, 0.0, 1000.0),
    ];
    let mut errors: Vec<_> = checks.into_iter().filter_map(Result::err).collect();
    check_time_range("attack", &tuning.attack, &mut errors);
    check_time_range("release", &tuning.release, &mut errors);
    collect(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_is_valid() {
        for port in ControlPort::ALL {
            let d = port.descriptor();
            assert_eq!(validate_control(d.key, d.default), Ok(port));
            assert!(validate_control(d.key, d.min).is_ok());
            assert!(validate_control(d.key, d.max).is_ok());
        }
    }

    #[test]
    fn nan_is_out_of_range() {
        assert!(matches!(
            validate_control("attack", f32::NAN),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn multiple_errors_are_collected() {
        let result = validate_controls([("ratio", 9.0), ("drive", 0.5), ("bogus", 0.0)]);
        let Err(ValidationError::Multiple(errors)) = result else {
            panic!("expected multiple errors, got {result:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::UnknownControl("bogus".to_string())));
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let result = validate_controls([("hpf_hz", 5.0)]);
        assert!(matches!(
            result,
            Err(ValidationError::OutOfRange { ref param, .. }) if param == "hpf_hz"
        ));
    }

    #[test]
    fn default_tuning_is_valid() {
        assert_eq!(validate_tuning(&DynamicsTuning::default()), Ok(()));
    }

    #[test]
    fn inverted_time_range_rejected() {
        let tuning = DynamicsTuning {
            release: TimeRange {
                fastest_s: 1.0,
                slowest_s: 0.1,
            },
            ..DynamicsTuning::default()
        };
        assert!(matches!(
            validate_tuning(&tuning),
            Err(ValidationError::InvertedTimeRange { ref param, .. }) if param == "release"
        ));
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::UnknownControl("a".to_string()),
            ValidationError::UnsupportedOversampleFactor(2),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: unknown control: a; unsupported oversampling factor 2 (expected 4 or 8)"
        );
    }
}
