//! Factory preset commands.

use clap::{Args, Subcommand};
use gua76_config::{factory_presets, get_factory_preset};
use gua76_dynamics::ControlPort;

#[derive(Args, Debug)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand, Debug)]
enum PresetsCommand {
    /// List factory presets
    List,

    /// Show every control of a preset
    Show {
        /// Preset identifier or display name
        name: String,

        /// Print the preset as TOML instead of a table
        #[arg(long)]
        toml: bool,
    },
}

pub fn run(args: &PresetsArgs) -> anyhow::Result<()> {
    match &args.command {
        PresetsCommand::List => {
            list_presets();
            Ok(())
        }
        PresetsCommand::Show { name, toml } => show_preset(name, *toml),
    }
}

fn list_presets() {
    println!("Factory Presets:");
    println!("================");
    for preset in factory_presets() {
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:18} - {}", preset.name, desc);
    }
}

fn show_preset(name: &str, as_toml: bool) -> anyhow::Result<()> {
    let preset = get_factory_preset(name)?;
    if as_toml {
        print!("{}", preset.to_toml()?);
        return Ok(());
    }

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    if let Some(desc) = &preset.description {
        println!("{desc}");
    }
    println!();

    for port in ControlPort::ALL {
        let d = port.descriptor();
        let marker = if preset.controls.contains_key(d.key) { "*" } else { " " };
        println!("  {marker} {:16} {}", d.key, preset.get(port));
    }
    println!();
    println!("  * set by the preset");

    Ok(())
}
