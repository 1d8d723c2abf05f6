//! Control presets.

use std::collections::BTreeMap;

use gua76_dynamics::{CONTROL_COUNT, ControlPort, ControlUnit, Controls};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_controls};

/// A preset value: toggles may be written as booleans, everything else as a number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ControlValue {
    /// `true` / `false` for switches.
    Toggle(bool),
    /// Raw port value.
    Value(f32),
}

impl ControlValue {
    /// Value as written to the control port.
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Toggle(on) => {
                if on {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Value(v) => v,
        }
    }
}

/// A named snapshot of the limiter's controls.
///
/// Only the controls a preset cares about need to be listed; the rest keep
/// their defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Drum Smash"
/// description = "All buttons in, fast attack"
///
/// [controls]
/// ratio = 4
/// attack = 0.0
/// release = 0.2
/// drive = 0.4
/// oversampling = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Control values keyed by [`ControlDescriptor::key`](gua76_dynamics::ControlDescriptor).
    #[serde(default)]
    pub controls: BTreeMap<String, ControlValue>,
}

impl Preset {
    /// Create a new preset with every control at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            controls: BTreeMap::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set one control.
    pub fn with_control(mut self, port: ControlPort, value: f32) -> Self {
        self.set(port, value);
        self
    }

    /// Captures the controls of `controls` that differ from their defaults.
    pub fn from_controls(name: impl Into<String>, controls: &Controls) -> Self {
        let mut preset = Self::new(name);
        let ports = controls.to_ports();
        for port in ControlPort::ALL {
            let value = ports[port.index()];
            if value != port.descriptor().default {
                preset.set(port, value);
            }
        }
        preset
    }

    /// Sets one control, writing switches as booleans.
    pub fn set(&mut self, port: ControlPort, value: f32) {
        let descriptor = port.descriptor();
        let value = if descriptor.unit == ControlUnit::Toggle {
            ControlValue::Toggle(value > 0.5)
        } else {
            ControlValue::Value(value)
        };
        self.controls.insert(descriptor.key.to_string(), value);
    }

    /// Value of `port`, or its default when the preset does not list it.
    pub fn get(&self, port: ControlPort) -> f32 {
        let descriptor = port.descriptor();
        self.controls
            .get(descriptor.key)
            .map_or(descriptor.default, |v| v.as_f32())
    }

    /// Load and validate a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let preset: Self = toml::from_str(toml_str)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every listed control against its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_controls(self.controls.iter().map(|(key, value)| (key.as_str(), value.as_f32())))
    }

    /// Full control array, defaults filled in.
    pub fn to_ports(&self) -> Result<[f32; CONTROL_COUNT], ConfigError> {
        self.validate()?;
        Ok(ControlPort::ALL.map(|port| self.get(port)))
    }

    /// Decoded control snapshot.
    pub fn to_controls(&self) -> Result<Controls, ConfigError> {
        Ok(Controls::from_ports(&self.to_ports()?))
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gua76_dynamics::Ratio;

    #[test]
    fn empty_preset_is_defaults() {
        let preset = Preset::new("Blank");
        assert_eq!(preset.to_controls().unwrap(), Controls::default());
        assert_eq!(preset.to_ports().unwrap(), Controls::default_ports());
    }

    #[test]
    fn parses_booleans_and_integers() {
        let preset = Preset::from_toml(
            r#"
name = "Smash"

[controls]
ratio = 4
bypass = false
mid_side = true
drive = 0.25
"#,
        )
        .unwrap();
        let controls = preset.to_controls().unwrap();
        assert_eq!(controls.ratio, Ratio::AllButtons);
        assert!(controls.mid_side);
        assert!(!controls.bypass);
        assert_eq!(controls.drive, 0.25);
    }

    #[test]
    fn unknown_control_rejected() {
        let err = Preset::from_toml("name = \"x\"\n[controls]\nmakeup = 3.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::UnknownControl(ref key)) if key == "makeup"
        ));
    }

    #[test]
    fn out_of_range_rejected() {
        let err =
            Preset::from_toml("name = \"x\"\n[controls]\ninput_gain_db = 30.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn from_controls_stores_only_changes() {
        let controls = Controls {
            ratio: Ratio::Twelve,
            link: true,
            ..Controls::default()
        };
        let preset = Preset::from_controls("Changed", &controls);
        assert_eq!(preset.controls.len(), 2);
        assert_eq!(preset.controls.get("link"), Some(&ControlValue::Toggle(true)));
        assert_eq!(preset.to_controls().unwrap(), controls);
    }

    #[test]
    fn toml_roundtrip() {
        let preset = Preset::new("Round")
            .with_description("trip")
            .with_control(ControlPort::HpfEnabled, 1.0)
            .with_control(ControlPort::HpfFrequency, 150.0)
            .with_control(ControlPort::Release, 0.7);
        let text = preset.to_toml().unwrap();
        assert!(text.contains("hpf_enabled = true"), "got: {text}");
        assert_eq!(Preset::from_toml(&text).unwrap(), preset);
    }
}
