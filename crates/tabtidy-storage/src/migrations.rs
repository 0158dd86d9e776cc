use anyhow::Result;
use rusqlite::Connection;

use crate::models::DEFAULT_FOCUS_INTERVAL_MS;

/// Initialize database schema
///
/// # Errors
///
/// Returns an error if table creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Reading list - append-only archive of closed tabs
    conn.execute(
        "CREATE TABLE IF NOT EXISTS reading_list (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            saved_at TEXT NOT NULL
        )",
        [],
    )?;

    // Settings - single row holding policy configuration
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            focus_mode INTEGER NOT NULL,
            focus_interval_ms INTEGER NOT NULL,
            blocked_sites TEXT NOT NULL,
            safe_sites TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Establish first-install defaults: focus mode off, default interval,
/// empty user lists. Idempotent - an existing settings row is untouched.
///
/// # Errors
///
/// Returns an error if the insert fails
pub fn insert_default_settings(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO settings (id, focus_mode, focus_interval_ms, blocked_sites, safe_sites)
         VALUES (1, 0, ?1, '[]', '[]')",
        [DEFAULT_FOCUS_INTERVAL_MS],
    )?;
    Ok(())
}
