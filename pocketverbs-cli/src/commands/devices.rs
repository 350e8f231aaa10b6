//! Output device listing.

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait};

pub fn run() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    let devices: Vec<cpal::Device> =
        host.output_devices().context("enumerating output devices")?.collect();
    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output devices ({}):", host.id().name());
    for (idx, dev) in devices.iter().enumerate() {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".into());
        let marker = if default_name.as_deref() == Some(name.as_str()) { " (default)" } else { "" };
        match dev.default_output_config() {
            Ok(cfg) => println!(
                "  [{}] {}{} - {} Hz, {} ch, {:?}",
                idx,
                name,
                marker,
                cfg.sample_rate().0,
                cfg.channels(),
                cfg.sample_format()
            ),
            Err(e) => println!("  [{}] {}{} - no default config ({})", idx, name, marker, e),
        }
    }
    println!();
    println!("Use the name with: pocketverbs play --device \"NAME\" INPUT");
    Ok(())
}
