//! Static transfer curve printout.

use clap::{Args, ValueEnum};
use gua76_core::{db_to_linear, linear_to_db};
use gua76_dynamics::{DynamicsTuning, GainComputer, Ratio};

/// Ratio choices for the CLI.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliRatio {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
    #[value(name = "12")]
    Twelve,
    #[value(name = "20")]
    Twenty,
    #[value(name = "all")]
    AllButtons,
}

impl From<CliRatio> for Ratio {
    fn from(r: CliRatio) -> Self {
        match r {
            CliRatio::Four => Ratio::Four,
            CliRatio::Eight => Ratio::Eight,
            CliRatio::Twelve => Ratio::Twelve,
            CliRatio::Twenty => Ratio::Twenty,
            CliRatio::AllButtons => Ratio::AllButtons,
        }
    }
}

#[derive(Args, Debug)]
pub struct CurveArgs {
    /// Ratios to print (all when omitted)
    #[arg(short, long, value_enum)]
    ratio: Vec<CliRatio>,

    /// Lowest input level in dBFS
    #[arg(long, default_value = "-40", allow_hyphen_values = true)]
    min_db: f32,

    /// Highest input level in dBFS
    #[arg(long, default_value = "6", allow_hyphen_values = true)]
    max_db: f32,

    /// Step between rows in dB
    #[arg(long, default_value = "2")]
    step_db: f32,

    /// Detector threshold, linear amplitude
    #[arg(long)]
    threshold: Option<f32>,
}

/// Steady-state output level in dBFS for a sustained input at `input_db`.
pub fn output_db(computer: &GainComputer, input_db: f32) -> f32 {
    linear_to_db(computer.output_level(db_to_linear(input_db)))
}

pub fn run(args: &CurveArgs) -> anyhow::Result<()> {
    if args.step_db.is_nan() || args.step_db <= 0.0 || args.max_db < args.min_db {
        anyhow::bail!("need --step-db > 0 and --max-db >= --min-db");
    }

    let mut tuning = DynamicsTuning::default();
    if let Some(threshold) = args.threshold {
        gua76_config::validation::check_range("threshold", threshold, 1e-4, 1.0)?;
        tuning.threshold = threshold;
    }

    let ratios: Vec<Ratio> = if args.ratio.is_empty() {
        Ratio::ALL.to_vec()
    } else {
        args.ratio.iter().map(|&r| r.into()).collect()
    };
    let computers: Vec<GainComputer> = ratios
        .iter()
        .map(|&r| GainComputer::for_ratio(r, &tuning))
        .collect();

    println!(
        "Static curve (threshold {:.1} dBFS, output dBFS per ratio)",
        linear_to_db(tuning.threshold)
    );
    print!("  {:>8}", "in");
    for ratio in &ratios {
        print!(" {:>8}", ratio.label());
    }
    println!();

    let rows = ((args.max_db - args.min_db) / args.step_db).floor() as usize;
    for row in 0..=rows {
        let input_db = args.min_db + row as f32 * args.step_db;
        print!("  {input_db:>8.1}");
        for computer in &computers {
            print!(" {:>8.2}", output_db(computer, input_db));
        }
        println!();
    }

    Ok(())
}
