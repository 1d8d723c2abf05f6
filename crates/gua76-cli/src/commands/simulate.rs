//! Offline simulation with generated test signals.

use clap::{Args, ValueEnum};
use gua76_core::db_to_linear;
use gua76_dynamics::{BlockInput, MeterReadings};

use super::common::{ControlArgs, EngineArgs, format_db};

/// Generated test signal shapes.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Signal {
    /// Steady sine
    #[default]
    Sine,
    /// Sine that jumps up 20 dB a tenth of the way in
    Step,
    /// 50 ms sine bursts every 250 ms
    Burst,
    /// Single-sample clicks every 500 ms
    Impulse,
    /// Constant DC level
    Dc,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(flatten)]
    controls: ControlArgs,

    /// Test signal
    #[arg(long, value_enum, default_value_t = Signal::Sine)]
    signal: Signal,

    /// Tone frequency in Hz
    #[arg(long, default_value = "1000")]
    freq: f32,

    /// Signal level in dBFS
    #[arg(long, default_value = "-6", allow_hyphen_values = true)]
    level_db: f32,

    /// Duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Host block size
    #[arg(long, default_value = "256")]
    block_size: usize,

    /// Interval between meter rows in milliseconds
    #[arg(long, default_value = "100")]
    report_ms: f32,
}

/// Generates `len` samples of `signal` at `amplitude`.
pub fn generate(
    signal: Signal,
    amplitude: f32,
    freq: f32,
    sample_rate: f32,
    len: usize,
) -> Vec<f32> {
    let tone = |n: usize| (2.0 * std::f32::consts::PI * freq * n as f32 / sample_rate).sin();
    let burst_period = (0.25 * sample_rate) as usize;
    let burst_on = (0.05 * sample_rate) as usize;
    let click_period = (0.5 * sample_rate).max(1.0) as usize;

    (0..len)
        .map(|n| match signal {
            Signal::Sine => amplitude * tone(n),
            Signal::Step => {
                let level = if n < len / 10 { amplitude * 0.1 } else { amplitude };
                level * tone(n)
            }
            Signal::Burst => {
                if burst_period > 0 && n % burst_period < burst_on {
                    amplitude * tone(n)
                } else {
                    0.0
                }
            }
            Signal::Impulse => {
                if n % click_period == 0 {
                    amplitude
                } else {
                    0.0
                }
            }
            Signal::Dc => amplitude,
        })
        .collect()
}

fn print_row(time_ms: f32, readings: &MeterReadings) {
    println!(
        "  {:>8.0} {:>8} {:>8} {:>8} {:>8} {:>8}",
        time_ms,
        format_db(readings.gain_reduction_db),
        format_db(readings.input_peak_db[0].max(readings.input_peak_db[1])),
        format_db(readings.output_peak_db[0].max(readings.output_peak_db[1])),
        format_db(readings.output_rms_db),
        format_db(readings.needle_db),
    );
}

pub fn run(args: &SimulateArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("--block-size must be at least 1");
    }
    if !(args.duration > 0.0 && args.duration.is_finite()) {
        anyhow::bail!("--duration must be a positive number of seconds");
    }

    let mut limiter = args.engine.build()?;
    let preset = args.controls.preset()?;
    let controls = preset.to_controls()?;
    let sample_rate = args.engine.sample_rate;

    let len = (args.duration * sample_rate) as usize;
    let input = generate(args.signal, db_to_linear(args.level_db), args.freq, sample_rate, len);
    let report_every = ((args.report_ms * 0.001 * sample_rate) as usize).max(1);

    tracing::info!(
        preset = %preset.name,
        signal = ?args.signal,
        level_db = args.level_db,
        samples = len,
        block_size = args.block_size,
        "simulating"
    );

    println!(
        "  {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "ms", "GR", "in pk", "out pk", "out rms", "needle"
    );

    let mut left = vec![0.0f32; args.block_size];
    let mut right = vec![0.0f32; args.block_size];
    let mut deepest_reduction = 0.0f32;
    let mut output_peak = 0.0f32;
    let mut next_report = report_every;
    let mut readings = limiter.readings(&controls);

    for (i, chunk) in input.chunks(args.block_size).enumerate() {
        let n = chunk.len();
        readings = limiter.run(
            &controls,
            BlockInput::new(chunk, chunk),
            &mut left[..n],
            &mut right[..n],
        );
        deepest_reduction = deepest_reduction.min(readings.gain_reduction_db);
        output_peak = left[..n]
            .iter()
            .chain(&right[..n])
            .fold(output_peak, |peak, x| peak.max(x.abs()));

        let processed = i * args.block_size + n;
        if processed >= next_report {
            print_row(processed as f32 * 1000.0 / sample_rate, &readings);
            next_report += report_every;
        }
    }

    println!();
    println!("Summary:");
    println!("  Deepest gain reduction: {} dB", format_db(deepest_reduction));
    println!("  Output sample peak:     {} dBFS", format_db(gua76_core::meter_db(output_peak)));
    println!("  Final output RMS:       {} dBFS", format_db(readings.output_rms_db));
    let overflows = limiter.oversample_overflows();
    if overflows > 0 {
        println!("  Blocks run at host rate (too large to oversample): {overflows}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_jumps_twenty_db() {
        let signal = generate(Signal::Step, 1.0, 1000.0, 48000.0, 48000);
        let early = signal[..4800].iter().fold(0.0f32, |p, x| p.max(x.abs()));
        let late = signal[4800..].iter().fold(0.0f32, |p, x| p.max(x.abs()));
        assert!((early - 0.1).abs() < 1e-3);
        assert!((late - 1.0).abs() < 1e-3);
    }

    #[test]
    fn impulse_clicks_on_schedule() {
        let signal = generate(Signal::Impulse, 0.5, 0.0, 48000.0, 48000);
        let clicks: Vec<usize> = signal
            .iter()
            .enumerate()
            .filter(|(_, x)| **x != 0.0)
            .map(|(n, _)| n)
            .collect();
        assert_eq!(clicks, vec![0, 24000]);
    }

    #[test]
    fn burst_has_silence() {
        let signal = generate(Signal::Burst, 1.0, 1000.0, 48000.0, 12000);
        assert!(signal[2400..12000].iter().all(|&x| x == 0.0));
    }
}
