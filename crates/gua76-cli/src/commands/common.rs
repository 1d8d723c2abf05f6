//! Arguments shared between commands.

use clap::Args;
use gua76_config::{EngineConfig, Preset, get_factory_preset, validate_control};
use gua76_dynamics::FetLimiter;

/// Processor construction options.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Host sample rate in Hz
    #[arg(long, default_value = "48000")]
    pub sample_rate: f32,

    /// Oversampling factor (4 or 8)
    #[arg(long, default_value = "8")]
    pub factor: u32,

    /// Largest block that runs oversampled
    #[arg(long, default_value = "1024")]
    pub max_block_size: usize,
}

impl EngineArgs {
    /// Engine config for these options, remaining fields at their defaults.
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.sample_rate,
            oversample_factor: self.factor,
            max_block_size: self.max_block_size,
            ..EngineConfig::default()
        }
    }

    /// Builds and activates a limiter.
    pub fn build(&self) -> anyhow::Result<FetLimiter> {
        let mut limiter = self.config().build()?;
        limiter.activate();
        Ok(limiter)
    }
}

/// Control selection: a factory preset plus individual overrides.
#[derive(Args, Debug)]
pub struct ControlArgs {
    /// Factory preset to start from
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Override a control, e.g. `--set ratio=4 --set mid_side=on`
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, f32)>,
}

impl ControlArgs {
    /// Resolved preset with overrides applied.
    pub fn preset(&self) -> anyhow::Result<Preset> {
        let mut preset = match &self.preset {
            Some(name) => get_factory_preset(name)?,
            None => Preset::new("Command line"),
        };
        for (key, value) in &self.overrides {
            let port = validate_control(key, *value)?;
            preset.set(port, *value);
        }
        Ok(preset)
    }
}

/// Parses `key=value`; switches also accept `on`/`off` and `true`/`false`.
pub fn parse_key_value(s: &str) -> Result<(String, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" => 1.0,
        "off" | "false" => 0.0,
        other => other
            .parse::<f32>()
            .map_err(|e| format!("invalid value for '{}': {e}", key.trim()))?,
    };
    Ok((key.trim().to_string(), value))
}

/// Formats a dB reading with the meter floor shown as `-inf`.
pub fn format_db(db: f32) -> String {
    if db <= gua76_core::METER_FLOOR_DB {
        "-inf".to_string()
    } else {
        format!("{db:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gua76_dynamics::Ratio;

    #[test]
    fn parses_numbers_and_switches() {
        assert_eq!(parse_key_value("ratio=4"), Ok(("ratio".to_string(), 4.0)));
        assert_eq!(parse_key_value(" link = on"), Ok(("link".to_string(), 1.0)));
        assert_eq!(parse_key_value("pad=False"), Ok(("pad".to_string(), 0.0)));
        assert!(parse_key_value("ratio").is_err());
        assert!(parse_key_value("ratio=loud").is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let args = ControlArgs {
            preset: Some("drum_smash".to_string()),
            overrides: vec![("ratio".to_string(), 1.0), ("listen".to_string(), 1.0)],
        };
        let controls = args.preset().unwrap().to_controls().unwrap();
        assert_eq!(controls.ratio, Ratio::Eight);
        assert!(controls.listen);
        assert!(controls.drive > 0.0, "preset values survive");
    }

    #[test]
    fn bad_override_is_an_error() {
        let args = ControlArgs {
            preset: None,
            overrides: vec![("drive".to_string(), 5.0)],
        };
        assert!(args.preset().is_err());
    }

    #[test]
    fn floor_prints_as_inf() {
        assert_eq!(format_db(-90.0), "-inf");
        assert_eq!(format_db(-3.04), "-3.0");
    }
}
