/// Block-list and allow-list management, written straight to the store; the
/// daemon re-reads the policy at every sweep, so no restart is needed.
use anyhow::Result;
use tabtidy_core::classifier::DEFAULT_BLOCKED_SITES;
use tabtidy_storage::Database;

pub fn block_add(site: &str) -> Result<()> {
    let db = Database::new(None)?;
    db.add_blocked_site(site)?;
    println!("Added '{site}' to the blocked-site list.");
    Ok(())
}

pub fn block_remove(site: &str) -> Result<()> {
    let db = Database::new(None)?;
    db.remove_blocked_site(site)?;
    println!("Removed '{site}' from the blocked-site list.");
    Ok(())
}

pub fn block_list() -> Result<()> {
    let db = Database::new(None)?;
    let settings = db.get_settings()?;
    println!("Built-in blocked sites:");
    for site in DEFAULT_BLOCKED_SITES {
        println!("  {site}");
    }
    if settings.blocked_sites.is_empty() {
        println!("No user-added blocked sites.");
    } else {
        println!("User-added blocked sites:");
        for site in &settings.blocked_sites {
            println!("  {site}");
        }
    }
    Ok(())
}

pub fn allow_add(site: &str) -> Result<()> {
    let db = Database::new(None)?;
    db.add_safe_site(site)?;
    println!("Added '{site}' to the allow list. Matching tabs are never closed.");
    Ok(())
}

pub fn allow_remove(site: &str) -> Result<()> {
    let db = Database::new(None)?;
    db.remove_safe_site(site)?;
    println!("Removed '{site}' from the allow list.");
    Ok(())
}

pub fn allow_list() -> Result<()> {
    let db = Database::new(None)?;
    let settings = db.get_settings()?;
    if settings.safe_sites.is_empty() {
        println!("Allow list is empty.");
    } else {
        println!("Allowed sites (never closed):");
        for site in &settings.safe_sites {
            println!("  {site}");
        }
    }
    Ok(())
}
