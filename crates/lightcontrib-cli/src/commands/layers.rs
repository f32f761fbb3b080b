//! Render layer and light-select element commands

use super::Session;
use lightcontrib_layers::{AggregationKind, Materializer};

pub fn layers(
    session: &mut Session,
    geometry: &[String],
    lights: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    materialize(session, AggregationKind::RenderLayer, geometry, lights)
}

pub fn elements(
    session: &mut Session,
    lights: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    materialize(session, AggregationKind::LightSelectElement, &[], lights)
}

fn materialize(
    session: &mut Session,
    kind: AggregationKind,
    geometry: &[String],
    lights: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = session.classifier()?;
    let materializer = Materializer::new(
        &session.catalog,
        &classifier,
        session.config.materialize.clone(),
    );

    if !materializer.is_available(kind) {
        println!(
            "{} is not installed; light-select elements are unavailable.",
            kind.required_subsystem()
        );
        return Ok(());
    }

    let created = match materializer.materialize(&mut session.scene, kind, geometry, lights) {
        Ok(created) => created,
        Err(e) => {
            for name in e.created() {
                println!("  created {}", name);
            }
            return Err(e.into());
        }
    };

    if created.is_empty() {
        println!("No lights found, nothing created.");
        return Ok(());
    }

    println!("Created {} {:?} aggregation(s):", created.len(), kind);
    for name in &created {
        println!("  {}", name);
    }
    Ok(())
}
