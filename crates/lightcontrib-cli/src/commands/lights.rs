//! Classification and light listing commands

use super::Session;
use lightcontrib_layers::{LightList, ListMode};

pub fn classify(session: &Session, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = session.classifier()?;

    for name in names {
        println!("{:<32} {}", name, classifier.classify(name));
    }
    Ok(())
}

pub fn groups(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = session.classifier()?;
    let list = LightList::query(&session.scene, &session.catalog, &classifier)?;

    if list.groups().is_empty() {
        println!("No visible lights.");
        return Ok(());
    }

    println!(
        "{} light(s) in {} group(s):",
        list.groups().member_count(),
        list.groups().len()
    );
    for (key, members) in list.groups().iter() {
        let names: Vec<&str> = members.iter().map(|l| l.name.as_str()).collect();
        println!("  {:<16} {}", key, names.join(", "));
    }
    Ok(())
}

pub fn list(session: &Session, by_group: bool) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = session.classifier()?;
    let list = LightList::query(&session.scene, &session.catalog, &classifier)?;
    let mode = if by_group {
        ListMode::Groups
    } else {
        ListMode::Lights
    };

    for entry in list.entries(mode) {
        println!("{}", entry);
    }
    Ok(())
}
