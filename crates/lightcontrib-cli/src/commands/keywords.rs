//! Keyword store commands

use super::Session;

pub fn list(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let store = session.keyword_store()?;

    println!("Keyword file: {}", store.path().display());
    println!("The light types in the DB are:");
    println!("  {}", store.display());
    Ok(())
}

pub fn add(session: &Session, keywords: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = session.keyword_store()?;
    store.append(keywords)?;

    println!("Keywords now: {}", store.display());
    Ok(())
}

pub fn reset(session: &Session, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        println!("Resetting discards every added keyword. Re-run with --yes to confirm.");
        return Ok(());
    }

    let mut store = session.keyword_store()?;
    store.reset(true)?;

    println!("Keywords reset to: {}", store.display());
    Ok(())
}
