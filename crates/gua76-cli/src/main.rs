//! gua76 CLI - Offline tools for the gua76 FET limiter.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gua76")]
#[command(author, version, about = "FET limiter command-line tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the static input/output curve of each ratio
    Curve(commands::curve::CurveArgs),

    /// Run a generated test signal through the limiter and print the meters
    Simulate(commands::simulate::SimulateArgs),

    /// List and show factory presets
    Presets(commands::presets::PresetsArgs),

    /// List the control ports with their ranges and defaults
    Controls,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Curve(args) => commands::curve::run(&args),
        Commands::Simulate(args) => commands::simulate::run(&args),
        Commands::Presets(args) => commands::presets::run(&args),
        Commands::Controls => commands::controls::run(),
    }
}
