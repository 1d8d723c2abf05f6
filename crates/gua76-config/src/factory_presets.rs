//! Factory presets bundled with the library.
//!
//! Embedded at compile time; always available without any files.

use crate::Preset;
use crate::error::ConfigError;

/// Internal identifiers of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "vocal_leveler",
    "drum_smash",
    "bass_glue",
    "bus_peak_catcher",
    "wide_master",
    "de_esser",
];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("vocal_leveler", VOCAL_LEVELER_PRESET),
    ("drum_smash", DRUM_SMASH_PRESET),
    ("bass_glue", BASS_GLUE_PRESET),
    ("bus_peak_catcher", BUS_PEAK_CATCHER_PRESET),
    ("wide_master", WIDE_MASTER_PRESET),
    ("de_esser", DE_ESSER_PRESET),
];

const INIT_PRESET: &str = r#"
name = "Init"
description = "Every control at its default: 4:1, fastest attack, oversampling on"
"#;

const VOCAL_LEVELER_PRESET: &str = r#"
name = "Vocal Leveler"
description = "Gentle 4:1 with medium attack and slow release for lead vocals"

[controls]
input_gain_db = 6.0
ratio = 0
attack = 0.45
release = 0.6
hpf_enabled = true
hpf_hz = 100.0
"#;

const DRUM_SMASH_PRESET: &str = r#"
name = "Drum Smash"
description = "All buttons in with fast release for room mics and parallel drums"

[controls]
input_gain_db = 8.0
output_gain_db = -6.0
ratio = 4
attack = 0.1
release = 0.15
drive = 0.4
"#;

const BASS_GLUE_PRESET: &str = r#"
name = "Bass Glue"
description = "8:1 with the low end filtered from detection so the fundamental does not pump"

[controls]
ratio = 1
attack = 0.6
release = 0.5
hpf_enabled = true
hpf_hz = 80.0
drive = 0.2
"#;

const BUS_PEAK_CATCHER_PRESET: &str = r#"
name = "Bus Peak Catcher"
description = "20:1 limiting that only touches the loudest transients"

[controls]
ratio = 3
attack = 0.0
release = 0.3
meter_mode = 2
"#;

const WIDE_MASTER_PRESET: &str = r#"
name = "Wide Master"
description = "Mid/side with linked detection so the stereo image holds under reduction"

[controls]
ratio = 0
attack = 0.5
release = 0.7
mid_side = true
link = true
lpf_enabled = true
lpf_hz = 12000.0
"#;

const DE_ESSER_PRESET: &str = r#"
name = "De-Esser"
description = "Fast 12:1 keyed from a narrow high band; enable listen to tune the band"

[controls]
ratio = 2
attack = 0.0
release = 0.1
hpf_enabled = true
hpf_hz = 5000.0
lpf_enabled = true
lpf_hz = 9000.0
sidechain_q = 1.2
"#;

/// All factory presets, parsed.
///
/// # Example
///
/// ```rust
/// use gua76_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {:?}", preset.name, preset.description);
/// }
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Looks a factory preset up by identifier or display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use gua76_config::get_factory_preset;
///
/// let preset = get_factory_preset("Drum Smash").unwrap();
/// assert_eq!(preset.name, "Drum Smash");
/// assert!(get_factory_preset("nope").is_err());
/// ```
pub fn get_factory_preset(name: &str) -> Result<Preset, ConfigError> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return Preset::from_toml(toml);
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
        .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` matches a factory preset identifier or display name.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_ok()
}
