//! Per-block control snapshot and the boundary port maps.
//!
//! A host hands the processor a flat array of [`CONTROL_COUNT`] floats per
//! block and reads back [`METER_COUNT`] meter floats. [`ControlPort`] and
//! [`MeterPort`] fix the order of both arrays; [`Controls`] and
//! [`MeterReadings`] are their typed forms.
//!
//! # Control Ports
//!
//! | Index | Key | Range | Default |
//! |-------|-----|-------|---------|
//! | 0 | `input_gain_db` | −20–20 dB | 0.0 |
//! | 1 | `output_gain_db` | −20–20 dB | 0.0 |
//! | 2 | `attack` | 0–1 | 0.0 |
//! | 3 | `release` | 0–1 | 0.4 |
//! | 4 | `ratio` | 0–4 (4:1, 8:1, 12:1, 20:1, all) | 0 |
//! | 5 | `meter_mode` | 0–2 (GR, input, output) | 0 |
//! | 6 | `bypass` | toggle | off |
//! | 7 | `drive` | 0–1 | 0.0 |
//! | 8 | `oversampling` | toggle | on |
//! | 9 | `hpf_enabled` | toggle | off |
//! | 10 | `hpf_hz` | 20–20000 Hz | 20 |
//! | 11 | `sidechain_q` | 0.1–10 | 0.707 |
//! | 12 | `lpf_enabled` | toggle | off |
//! | 13 | `lpf_hz` | 20–20000 Hz | 20000 |
//! | 14 | `listen` | toggle | off |
//! | 15 | `mid_side` | toggle | off |
//! | 16 | `link` | toggle | off |
//! | 17 | `pad` | toggle | off |

use gua76_core::{BUTTERWORTH_Q, METER_FLOOR_DB};

use crate::gain::Ratio;

/// Number of control inputs.
pub const CONTROL_COUNT: usize = 18;

/// Number of meter outputs.
pub const METER_COUNT: usize = 7;

/// Toggle ports read as on above this value.
const TOGGLE_THRESHOLD: f32 = 0.5;

/// Unit a control is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlUnit {
    /// Level in decibels.
    Decibels,
    /// Knob position in `[0, 1]`.
    Normalized,
    /// Frequency in Hz.
    Hertz,
    /// Filter resonance.
    Q,
    /// Discrete selector position.
    Selector,
    /// On/off switch.
    Toggle,
}

/// Range and default of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDescriptor {
    /// Display name.
    pub name: &'static str,
    /// Stable identifier used in presets.
    pub key: &'static str,
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value of a fresh instance.
    pub default: f32,
    /// Unit of the raw value.
    pub unit: ControlUnit,
}

impl ControlDescriptor {
    const fn new(
        name: &'static str,
        key: &'static str,
        min: f32,
        max: f32,
        default: f32,
        unit: ControlUnit,
    ) -> Self {
        Self {
            name,
            key,
            min,
            max,
            default,
            unit,
        }
    }

    const fn toggle(name: &'static str, key: &'static str, default_on: bool) -> Self {
        Self::new(name, key, 0.0, 1.0, if default_on { 1.0 } else { 0.0 }, ControlUnit::Toggle)
    }

    /// Clamps `value` into range; NaN becomes the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Control input ports, in boundary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPort {
    /// Input gain, dB.
    InputGain,
    /// Output gain, dB.
    OutputGain,
    /// Attack knob.
    Attack,
    /// Release knob.
    Release,
    /// Ratio selector.
    Ratio,
    /// Meter needle selector.
    MeterMode,
    /// Bypass switch.
    Bypass,
    /// Saturation drive.
    Drive,
    /// Oversampling switch.
    Oversampling,
    /// Sidechain high-pass switch.
    HpfEnabled,
    /// Sidechain high-pass cutoff.
    HpfFrequency,
    /// Resonance shared by both sidechain filters.
    SidechainQ,
    /// Sidechain low-pass switch.
    LpfEnabled,
    /// Sidechain low-pass cutoff.
    LpfFrequency,
    /// Sidechain listen switch.
    Listen,
    /// Mid/Side mode switch.
    MidSide,
    /// Mid/Side detector link switch.
    Link,
    /// −10 dB input pad.
    Pad,
}

impl ControlPort {
    /// Every port in boundary order.
    pub const ALL: [Self; CONTROL_COUNT] = [
        Self::InputGain,
        Self::OutputGain,
        Self::Attack,
        Self::Release,
        Self::Ratio,
        Self::MeterMode,
        Self::Bypass,
        Self::Drive,
        Self::Oversampling,
        Self::HpfEnabled,
        Self::HpfFrequency,
        Self::SidechainQ,
        Self::LpfEnabled,
        Self::LpfFrequency,
        Self::Listen,
        Self::MidSide,
        Self::Link,
        Self::Pad,
    ];

    /// Index into the control array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks a port up by its preset key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|port| port.descriptor().key == key)
    }

    /// Range, default and naming for the port.
    pub fn descriptor(self) -> ControlDescriptor {
        use ControlUnit::{Decibels, Hertz, Normalized, Q, Selector};
        match self {
            Self::InputGain => {
                ControlDescriptor::new("Input", "input_gain_db", -20.0, 20.0, 0.0, Decibels)
            }
            Self::OutputGain => {
                ControlDescriptor::new("Output", "output_gain_db", -20.0, 20.0, 0.0, Decibels)
            }
            Self::Attack => ControlDescriptor::new("Attack", "attack", 0.0, 1.0, 0.0, Normalized),
            Self::Release => {
                ControlDescriptor::new("Release", "release", 0.0, 1.0, 0.4, Normalized)
            }
            Self::Ratio => ControlDescriptor::new("Ratio", "ratio", 0.0, 4.0, 0.0, Selector),
            Self::MeterMode => {
                ControlDescriptor::new("Meter", "meter_mode", 0.0, 2.0, 0.0, Selector)
            }
            Self::Bypass => ControlDescriptor::toggle("Bypass", "bypass", false),
            Self::Drive => ControlDescriptor::new("Drive", "drive", 0.0, 1.0, 0.0, Normalized),
            Self::Oversampling => ControlDescriptor::toggle("Oversampling", "oversampling", true),
            Self::HpfEnabled => ControlDescriptor::toggle("SC HPF", "hpf_enabled", false),
            Self::HpfFrequency => {
                ControlDescriptor::new("SC HPF Freq", "hpf_hz", 20.0, 20000.0, 20.0, Hertz)
            }
            Self::SidechainQ => {
                ControlDescriptor::new("SC Q", "sidechain_q", 0.1, 10.0, BUTTERWORTH_Q, Q)
            }
            Self::LpfEnabled => ControlDescriptor::toggle("SC LPF", "lpf_enabled", false),
            Self::LpfFrequency => {
                ControlDescriptor::new("SC LPF Freq", "lpf_hz", 20.0, 20000.0, 20000.0, Hertz)
            }
            Self::Listen => ControlDescriptor::toggle("SC Listen", "listen", false),
            Self::MidSide => ControlDescriptor::toggle("Mid/Side", "mid_side", false),
            Self::Link => ControlDescriptor::toggle("M/S Link", "link", false),
            Self::Pad => ControlDescriptor::toggle("Pad -10dB", "pad", false),
        }
    }
}

/// Which reading the meter needle mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeterMode {
    /// Gain reduction.
    #[default]
    GainReduction,
    /// Louder input channel.
    Input,
    /// Louder output channel.
    Output,
}

impl MeterMode {
    /// Every mode, in selector order.
    pub const ALL: [Self; 3] = [Self::GainReduction, Self::Input, Self::Output];

    /// Decodes a selector value (rounded, clamped; NaN selects gain reduction).
    pub fn from_selector(value: f32) -> Self {
        if value.is_nan() {
            return Self::GainReduction;
        }
        let index = libm::roundf(value).clamp(0.0, (Self::ALL.len() - 1) as f32) as usize;
        Self::ALL[index]
    }

    /// Position on the selector.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Snapshot of every control, read once at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Input gain in dB.
    pub input_gain_db: f32,
    /// Output gain in dB.
    pub output_gain_db: f32,
    /// Attack knob position, 0 = fastest.
    pub attack: f32,
    /// Release knob position, 0 = fastest.
    pub release: f32,
    /// Selected ratio.
    pub ratio: Ratio,
    /// Needle source.
    pub meter_mode: MeterMode,
    /// Copy input to output untouched.
    pub bypass: bool,
    /// Saturation drive, 0–1.
    pub drive: f32,
    /// Run the dynamics stage oversampled.
    pub oversampling: bool,
    /// Sidechain high-pass on.
    pub hpf_enabled: bool,
    /// Sidechain high-pass cutoff in Hz.
    pub hpf_hz: f32,
    /// Resonance of both sidechain filters.
    pub sidechain_q: f32,
    /// Sidechain low-pass on.
    pub lpf_enabled: bool,
    /// Sidechain low-pass cutoff in Hz.
    pub lpf_hz: f32,
    /// Output the filtered sidechain instead of the program.
    pub listen: bool,
    /// Process in the Mid/Side domain.
    pub mid_side: bool,
    /// Drive both M/S chains from the louder envelope.
    pub link: bool,
    /// −10 dB pad ahead of the input gain.
    pub pad: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self::from_ports(&Self::default_ports())
    }
}

impl Controls {
    /// Port array holding every control's default.
    pub fn default_ports() -> [f32; CONTROL_COUNT] {
        ControlPort::ALL.map(|port| port.descriptor().default)
    }

    /// Decodes a raw control array.
    ///
    /// Toggles are on above 0.5, selectors are rounded to the nearest valid
    /// entry, continuous values are clamped to their ranges.
    ///
    /// ```rust
    /// use gua76_dynamics::{Controls, ControlPort, Ratio, CONTROL_COUNT};
    ///
    /// let mut ports = Controls::default_ports();
    /// ports[ControlPort::Ratio.index()] = 3.2;
    /// ports[ControlPort::Bypass.index()] = 0.9;
    /// ports[ControlPort::InputGain.index()] = 60.0;
    ///
    /// let controls = Controls::from_ports(&ports);
    /// assert_eq!(controls.ratio, Ratio::Twenty);
    /// assert!(controls.bypass);
    /// assert_eq!(controls.input_gain_db, 20.0);
    /// ```
    pub fn from_ports(ports: &[f32; CONTROL_COUNT]) -> Self {
        let value = |port: ControlPort| port.descriptor().clamp(ports[port.index()]);
        let toggle = |port: ControlPort| ports[port.index()] > TOGGLE_THRESHOLD;

        Self {
            input_gain_db: value(ControlPort::InputGain),
            output_gain_db: value(ControlPort::OutputGain),
            attack: value(ControlPort::Attack),
            release: value(ControlPort::Release),
            ratio: Ratio::from_selector(ports[ControlPort::Ratio.index()]),
            meter_mode: MeterMode::from_selector(ports[ControlPort::MeterMode.index()]),
            bypass: toggle(ControlPort::Bypass),
            drive: value(ControlPort::Drive),
            oversampling: toggle(ControlPort::Oversampling),
            hpf_enabled: toggle(ControlPort::HpfEnabled),
            hpf_hz: value(ControlPort::HpfFrequency),
            sidechain_q: value(ControlPort::SidechainQ),
            lpf_enabled: toggle(ControlPort::LpfEnabled),
            lpf_hz: value(ControlPort::LpfFrequency),
            listen: toggle(ControlPort::Listen),
            mid_side: toggle(ControlPort::MidSide),
            link: toggle(ControlPort::Link),
            pad: toggle(ControlPort::Pad),
        }
    }

    /// Encodes the snapshot back into a port array.
    pub fn to_ports(&self) -> [f32; CONTROL_COUNT] {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        ControlPort::ALL.map(|port| match port {
            ControlPort::InputGain => self.input_gain_db,
            ControlPort::OutputGain => self.output_gain_db,
            ControlPort::Attack => self.attack,
            ControlPort::Release => self.release,
            ControlPort::Ratio => self.ratio.index() as f32,
            ControlPort::MeterMode => self.meter_mode.index() as f32,
            ControlPort::Bypass => flag(self.bypass),
            ControlPort::Drive => self.drive,
            ControlPort::Oversampling => flag(self.oversampling),
            ControlPort::HpfEnabled => flag(self.hpf_enabled),
            ControlPort::HpfFrequency => self.hpf_hz,
            ControlPort::SidechainQ => self.sidechain_q,
            ControlPort::LpfEnabled => flag(self.lpf_enabled),
            ControlPort::LpfFrequency => self.lpf_hz,
            ControlPort::Listen => flag(self.listen),
            ControlPort::MidSide => flag(self.mid_side),
            ControlPort::Link => flag(self.link),
            ControlPort::Pad => flag(self.pad),
        })
    }

    /// Total input gain in dB, pad included.
    pub fn input_level_db(&self) -> f32 {
        const PAD_DB: f32 = -10.0;
        self.input_gain_db + if self.pad { PAD_DB } else { 0.0 }
    }
}

/// Meter output ports, in boundary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterPort {
    /// Gain reduction, dB (≤ 0).
    GainReduction,
    /// Input peak left, dB.
    InputPeakLeft,
    /// Input peak right, dB.
    InputPeakRight,
    /// Output peak left, dB.
    OutputPeakLeft,
    /// Output peak right, dB.
    OutputPeakRight,
    /// Output RMS, dB.
    OutputRms,
    /// Reading selected by [`MeterMode`], dB.
    Needle,
}

impl MeterPort {
    /// Every port in boundary order.
    pub const ALL: [Self; METER_COUNT] = [
        Self::GainReduction,
        Self::InputPeakLeft,
        Self::InputPeakRight,
        Self::OutputPeakLeft,
        Self::OutputPeakRight,
        Self::OutputRms,
        Self::Needle,
    ];

    /// Index into the meter array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::GainReduction => "GR",
            Self::InputPeakLeft => "In L",
            Self::InputPeakRight => "In R",
            Self::OutputPeakLeft => "Out L",
            Self::OutputPeakRight => "Out R",
            Self::OutputRms => "Out RMS",
            Self::Needle => "Needle",
        }
    }
}

/// Meter values produced by one block, all in dB with a −90 dB floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReadings {
    /// Smoothed gain reduction, ≤ 0.
    pub gain_reduction_db: f32,
    /// Input peak, left then right.
    pub input_peak_db: [f32; 2],
    /// Output peak, left then right.
    pub output_peak_db: [f32; 2],
    /// Smoothed output RMS.
    pub output_rms_db: f32,
    /// Reading picked by the meter mode.
    pub needle_db: f32,
}

impl Default for MeterReadings {
    fn default() -> Self {
        Self {
            gain_reduction_db: 0.0,
            input_peak_db: [METER_FLOOR_DB; 2],
            output_peak_db: [METER_FLOOR_DB; 2],
            output_rms_db: METER_FLOOR_DB,
            needle_db: 0.0,
        }
    }
}

impl MeterReadings {
    /// Flat meter array in [`MeterPort`] order.
    pub fn to_ports(&self) -> [f32; METER_COUNT] {
        MeterPort::ALL.map(|port| self.get(port))
    }

    /// Single reading.
    pub fn get(&self, port: MeterPort) -> f32 {
        match port {
            MeterPort::GainReduction => self.gain_reduction_db,
            MeterPort::InputPeakLeft => self.input_peak_db[0],
            MeterPort::InputPeakRight => self.input_peak_db[1],
            MeterPort::OutputPeakLeft => self.output_peak_db[0],
            MeterPort::OutputPeakRight => self.output_peak_db[1],
            MeterPort::OutputRms => self.output_rms_db,
            MeterPort::Needle => self.needle_db,
        }
    }
}
