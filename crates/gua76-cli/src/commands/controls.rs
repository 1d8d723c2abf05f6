//! Control port listing.

use gua76_dynamics::{ControlPort, ControlUnit, MeterPort};

fn unit_label(unit: ControlUnit) -> &'static str {
    match unit {
        ControlUnit::Decibels => "dB",
        ControlUnit::Normalized => "0-1",
        ControlUnit::Hertz => "Hz",
        ControlUnit::Q => "Q",
        ControlUnit::Selector => "select",
        ControlUnit::Toggle => "on/off",
    }
}

pub fn run() -> anyhow::Result<()> {
    println!("Control Ports:");
    println!("==============");
    println!(
        "  {:>3}  {:16} {:14} {:>8} {:>8} {:>8}  unit",
        "#", "key", "name", "min", "max", "default"
    );
    for port in ControlPort::ALL {
        let d = port.descriptor();
        println!(
            "  {:>3}  {:16} {:14} {:>8} {:>8} {:>8}  {}",
            port.index(),
            d.key,
            d.name,
            d.min,
            d.max,
            d.default,
            unit_label(d.unit)
        );
    }
    println!();

    println!("Meter Ports:");
    println!("============");
    for port in MeterPort::ALL {
        println!("  {:>3}  {}", port.index(), port.name());
    }

    Ok(())
}
