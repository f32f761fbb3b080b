//! Probe command

use super::Session;
use lightcontrib_core::Subsystem;
use lightcontrib_layers::LightPreset;

pub fn run(session: &Session) {
    let catalog = &session.catalog;

    println!("Rendering Subsystems");
    println!("====================\n");
    for subsystem in Subsystem::ALL {
        let marker = if catalog.has(subsystem) { "✓" } else { "✗" };
        println!("  {} {:<12} (alias '{}')", marker, subsystem.name(), subsystem.alias());
    }

    println!();
    println!("Light Kinds:");
    for kind in &catalog.light_kinds {
        let env = if kind.kind.is_environment() {
            " [environment]"
        } else {
            ""
        };
        println!("  - {} ({}){}", kind.kind.node_kind(), kind.subsystem, env);
    }

    println!();
    println!("Non-geometry Kinds:");
    for kind in &catalog.non_geometry {
        println!("  - {}", kind);
    }

    println!();
    println!("Light Presets:");
    for preset in LightPreset::available(catalog) {
        println!("  - {:<10} {}", preset.name(), preset.label());
    }
}
