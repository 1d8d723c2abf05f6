//! Host-rate metering for the limiter.

use gua76_core::{GainReductionMeter, PeakMeter, RmsMeter};

use crate::config::DynamicsTuning;
use crate::controls::{MeterMode, MeterReadings};

/// Input and output peak meters, the gain-reduction display and the output
/// RMS meter, all updated once per host block.
#[derive(Debug, Clone)]
pub struct MeterBank {
    input: [PeakMeter; 2],
    output: [PeakMeter; 2],
    gain_reduction: GainReductionMeter,
    output_rms: RmsMeter,
}

impl MeterBank {
    /// Creates meters at silence and 0 dB of reduction.
    pub fn new(sample_rate: f32, tuning: &DynamicsTuning) -> Self {
        let peak = PeakMeter::new(sample_rate, tuning.peak_decay_s);
        Self {
            input: [peak.clone(), peak.clone()],
            output: [peak.clone(), peak],
            gain_reduction: GainReductionMeter::new(sample_rate, tuning.gr_meter_smoothing_s),
            output_rms: RmsMeter::new(sample_rate, tuning.rms_meter_smoothing_s),
        }
    }

    /// Feeds the host input block.
    pub fn update_input(&mut self, left: &[f32], right: &[f32]) {
        self.input[0].update(left);
        self.input[1].update(right);
    }

    /// Feeds the host output block.
    pub fn update_output(&mut self, left: &[f32], right: &[f32]) {
        self.output[0].update(left);
        self.output[1].update(right);
        self.output_rms.update(left, right);
    }

    /// Moves the reduction display toward `min_gain` for a block of `len` samples.
    pub fn update_gain_reduction(&mut self, min_gain: f32, len: usize) {
        self.gain_reduction.update(min_gain, len);
    }

    /// Shows exactly 0 dB of reduction (bypass).
    pub fn clear_gain_reduction(&mut self) {
        self.gain_reduction.reset();
    }

    /// Current readings, with the needle following `mode`.
    pub fn readings(&self, mode: MeterMode) -> MeterReadings {
        let gain_reduction_db = self.gain_reduction.reduction_db();
        let input_peak_db = [self.input[0].peak_db(), self.input[1].peak_db()];
        let output_peak_db = [self.output[0].peak_db(), self.output[1].peak_db()];
        let needle_db = match mode {
            MeterMode::GainReduction => gain_reduction_db,
            MeterMode::Input => input_peak_db[0].max(input_peak_db[1]),
            MeterMode::Output => output_peak_db[0].max(output_peak_db[1]),
        };
        MeterReadings {
            gain_reduction_db,
            input_peak_db,
            output_peak_db,
            output_rms_db: self.output_rms.level_db(),
            needle_db,
        }
    }

    /// Returns every meter to its idle reading.
    pub fn reset(&mut self) {
        for meter in self.input.iter_mut().chain(self.output.iter_mut()) {
            meter.reset();
        }
        self.gain_reduction.reset();
        self.output_rms.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gua76_core::METER_FLOOR_DB;

    #[test]
    fn idle_readings() {
        let bank = MeterBank::new(48000.0, &DynamicsTuning::default());
        let readings = bank.readings(MeterMode::Output);
        assert_eq!(readings.gain_reduction_db, 0.0);
        assert_eq!(readings.input_peak_db, [METER_FLOOR_DB; 2]);
        assert_eq!(readings.output_rms_db, METER_FLOOR_DB);
        assert_eq!(readings.needle_db, METER_FLOOR_DB);
    }

    #[test]
    fn needle_follows_mode() {
        let mut bank = MeterBank::new(48000.0, &DynamicsTuning::default());
        bank.update_input(&[0.5; 64], &[1.0; 64]);
        bank.update_output(&[0.25; 64], &[0.1; 64]);
        bank.update_gain_reduction(0.5, 64);

        let input = bank.readings(MeterMode::Input);
        assert!(input.needle_db.abs() < 1e-6);
        let output = bank.readings(MeterMode::Output);
        assert!((output.needle_db - output.output_peak_db[0]).abs() < 1e-6);
        let gr = bank.readings(MeterMode::GainReduction);
        assert!(gr.needle_db < 0.0);
        assert_eq!(gr.needle_db, gr.gain_reduction_db);
    }

    #[test]
    fn clear_shows_no_reduction() {
        let mut bank = MeterBank::new(48000.0, &DynamicsTuning::default());
        bank.update_gain_reduction(0.1, 4800);
        assert!(bank.readings(MeterMode::GainReduction).gain_reduction_db < -10.0);
        bank.clear_gain_reduction();
        assert_eq!(bank.readings(MeterMode::GainReduction).gain_reduction_db, 0.0);
    }
}
