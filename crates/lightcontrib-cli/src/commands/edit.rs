//! Light edit and creation commands

use super::Session;
use lightcontrib_layers::{LightEditor, LightList, LightParam, LightPreset, ListMode};

pub fn run(
    session: &mut Session,
    param: LightParam,
    value: &str,
    lights: &[String],
    groups: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let names = if groups {
        let classifier = session.classifier()?;
        LightList::query(&session.scene, &session.catalog, &classifier)?
            .expand(lights, ListMode::Groups)
    } else {
        lights.to_vec()
    };
    if !lights.is_empty() && names.is_empty() {
        println!("No matching lights.");
        return Ok(());
    }

    let editor = LightEditor::new(&session.catalog);
    let targets = editor.targets(&session.scene, &names)?;
    if targets.is_empty() {
        println!("Please select some lights.");
        return Ok(());
    }

    let edited = editor.apply_input(&mut session.scene, param, value, &targets)?;
    for light in &edited {
        match &light.renamed_to {
            Some(name) => match &light.shape_renamed_to {
                Some(shape) => println!("  {} -> {} ({})", light.node, name, shape),
                None => println!("  {} -> {}", light.node, name),
            },
            None => println!("  {}.{} = {}", light.node, param, value),
        }
    }
    Ok(())
}

pub fn create(session: &mut Session, preset: &str) -> Result<(), Box<dyn std::error::Error>> {
    let preset: LightPreset = preset.parse()?;
    let shape = preset.create(&mut session.scene, &session.catalog)?;

    println!("Created {} ({})", shape, preset.label());
    Ok(())
}
