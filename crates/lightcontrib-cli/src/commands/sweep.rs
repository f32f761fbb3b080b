//! Isolation sweep command

use super::Session;
use lightcontrib_core::LogProgress;
use lightcontrib_layers::{LightList, ListMode};
use lightcontrib_sweep::IsolationSweep;

pub fn run(
    session: &mut Session,
    groups: bool,
    save_images: bool,
    lights: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = session.classifier()?;

    let mut config = session.config.sweep.clone();
    if groups {
        config = config.with_groups(true);
    }
    if save_images {
        config = config.with_save_images(true);
    }

    let targets = if config.use_groups && !lights.is_empty() {
        LightList::query(&session.scene, &session.catalog, &classifier)?
            .expand(lights, ListMode::Groups)
    } else {
        lights.to_vec()
    };
    if !lights.is_empty() && targets.is_empty() {
        println!("No matching lights.");
        return Ok(());
    }

    let mut sweep = IsolationSweep::new(&session.catalog, &classifier, config);
    let report = sweep.run(&mut session.scene, &targets, &mut LogProgress)?;

    if report.is_empty() {
        println!("No lights to render.");
        return Ok(());
    }

    println!("Rendered {} unit(s):", report.len());
    for capture in &report.captures {
        println!("  {}", capture.caption);
        if let Some(path) = &capture.saved_to {
            println!("    saved to {}", path.display());
        }
    }
    Ok(())
}
