//! `kiln --list`: shows the configured platforms and the devices selected
//! by the device-type filter.

use std::fmt::Write;

use kiln_build::BatchError;
use kiln_common::Target;
use serde_json::json;

use crate::{project, Cli, GlobalArgs, ReportFormat};

/// Runs the listing. Fails if no platform is configured.
pub fn run(cli: &Cli, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = project::load(global)?;
    let targets = kiln_config::discover_targets(&config, project::device_type(cli, &config));
    if targets.is_empty() {
        return Err(BatchError::NoTargetsFound.into());
    }

    match cli.format {
        ReportFormat::Text => print!("{}", render_listing(&targets)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&listing_json(&targets))?),
    }
    Ok(0)
}

/// Formats targets the way the listing prints them.
pub fn render_listing(targets: &[Target]) -> String {
    let mut out = String::new();
    for target in targets {
        let p = &target.platform;
        let _ = writeln!(out, "Platform #{}:", target.platform_index);
        let _ = writeln!(out, "  Profile: {}", p.profile);
        let _ = writeln!(out, "  Name: {}", p.name);
        let _ = writeln!(out, "  Vendor: {}", p.vendor);
        let _ = writeln!(out, "  Extensions: {}", p.extensions);
        for device in &target.devices {
            let info = &device.info;
            let _ = writeln!(out, "  Device #{} ({}):", device.id.index, device.kind);
            let _ = writeln!(out, "    Name: {}", device.name);
            let _ = writeln!(out, "    Vendor: {}", info.vendor);
            let _ = writeln!(out, "    Device Version: {}", info.version);
            let _ = writeln!(out, "    Driver Version: {}", info.driver_version);
            let _ = writeln!(out, "    Extensions: {}", info.extensions);
            let _ = writeln!(out, "    Max Compute Units: {}", info.max_compute_units);
            let _ = writeln!(
                out,
                "    Preferred Vector Width (Float): {}",
                info.preferred_vector_width_float
            );
            let _ = writeln!(
                out,
                "    Preferred Vector Width (Double): {}",
                info.preferred_vector_width_double
            );
            if device.compiler_target != device.name {
                let _ = writeln!(out, "    Compiler Target: {}", device.compiler_target);
            }
        }
    }
    out
}

fn listing_json(targets: &[Target]) -> serde_json::Value {
    let platforms: Vec<_> = targets
        .iter()
        .map(|t| {
            json!({
                "index": t.platform_index,
                "platform": t.platform,
                "devices": t.devices,
            })
        })
        .collect();
    json!({ "platforms": platforms })
}
