use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use crate::migrations;
use crate::models::{ReadingListEntry, Settings};

/// Database connection wrapper. The inner mutex makes the wrapper shareable
/// across tasks; every public method is a single short transaction, so the
/// reading-list append is an atomic operation rather than a read-modify-write
/// over the whole list.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Errors
    ///
    /// Returns an error if database directory creation, connection opening,
    /// or schema initialization fails
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = db_path.unwrap_or_else(Self::default_db_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(&path).context("Failed to open database connection")?;

        migrations::init_schema(&conn)?;
        migrations::insert_default_settings(&conn)?;

        log::info!("Database initialized at: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get default database path
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("tabtidy");
        path.push("tabtidy.db");
        path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database mutex poisoned"))
    }

    /// Append one entry to the reading list. Single atomic insert; safe to
    /// call from interleaved tasks without losing entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub fn append_reading_entry(&self, entry: &ReadingListEntry) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO reading_list (id, url, title, saved_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id.to_string(),
                entry.url,
                entry.title,
                entry.saved_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the full reading list in append order (most-recent-last)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupted
    pub fn reading_list(&self) -> Result<Vec<ReadingListEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, url, title, saved_at FROM reading_list ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, url, title, saved_at) = row?;
            entries.push(ReadingListEntry {
                id: id.parse().context("Invalid entry id in reading list")?,
                url,
                title,
                saved_at: saved_at
                    .parse::<DateTime<Utc>>()
                    .context("Invalid timestamp in reading list")?,
            });
        }
        Ok(entries)
    }

    /// Get current policy settings
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or stored lists fail to parse
    pub fn get_settings(&self) -> Result<Settings> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT focus_mode, focus_interval_ms, blocked_sites, safe_sites
             FROM settings WHERE id = 1",
        )?;
        let (focus_mode, focus_interval_ms, blocked_json, safe_json) =
            stmt.query_row([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?;

        Ok(Settings {
            focus_mode: focus_mode != 0,
            focus_interval_ms,
            blocked_sites: serde_json::from_str(&blocked_json)
                .context("Invalid blocked_sites in settings")?,
            safe_sites: serde_json::from_str(&safe_json)
                .context("Invalid safe_sites in settings")?,
        })
    }

    /// Persist whether focus mode is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub fn set_focus_mode(&self, enabled: bool) -> Result<()> {
        self.conn()?.execute(
            "UPDATE settings SET focus_mode = ?1 WHERE id = 1",
            [i64::from(enabled)],
        )?;
        Ok(())
    }

    /// Persist the focus sweep interval
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is zero or the update fails
    pub fn set_focus_interval_ms(&self, interval_ms: u64) -> Result<()> {
        anyhow::ensure!(interval_ms > 0, "Focus interval must be positive");
        self.conn()?.execute(
            "UPDATE settings SET focus_interval_ms = ?1 WHERE id = 1",
            [interval_ms],
        )?;
        Ok(())
    }

    /// Add a domain substring to the user block list
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read or written
    pub fn add_blocked_site(&self, site: &str) -> Result<()> {
        self.update_list("blocked_sites", |list| {
            if !list.iter().any(|s| s == site) {
                list.push(site.to_string());
            }
        })
    }

    /// Remove a domain substring from the user block list
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read or written
    pub fn remove_blocked_site(&self, site: &str) -> Result<()> {
        self.update_list("blocked_sites", |list| list.retain(|s| s != site))
    }

    /// Add a domain substring to the allow list
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read or written
    pub fn add_safe_site(&self, site: &str) -> Result<()> {
        self.update_list("safe_sites", |list| {
            if !list.iter().any(|s| s == site) {
                list.push(site.to_string());
            }
        })
    }

    /// Remove a domain substring from the allow list
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read or written
    pub fn remove_safe_site(&self, site: &str) -> Result<()> {
        self.update_list("safe_sites", |list| list.retain(|s| s != site))
    }

    fn update_list(&self, column: &str, mutate: impl FnOnce(&mut Vec<String>)) -> Result<()> {
        let conn = self.conn()?;
        let json: String = conn.query_row(
            &format!("SELECT {column} FROM settings WHERE id = 1"),
            [],
            |row| row.get(0),
        )?;
        let mut list: Vec<String> =
            serde_json::from_str(&json).with_context(|| format!("Invalid {column} in settings"))?;
        mutate(&mut list);
        conn.execute(
            &format!("UPDATE settings SET {column} = ?1 WHERE id = 1"),
            [serde_json::to_string(&list)?],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(Some(dir.path().join("test.db"))).unwrap();
        (dir, db)
    }

    #[test]
    fn first_open_establishes_defaults() {
        let (_dir, db) = open_temp_db();
        let settings = db.get_settings().unwrap();
        assert!(!settings.focus_mode);
        assert_eq!(settings.focus_interval_ms, crate::DEFAULT_FOCUS_INTERVAL_MS);
        assert!(settings.blocked_sites.is_empty());
        assert!(settings.safe_sites.is_empty());
        assert!(db.reading_list().unwrap().is_empty());
    }

    #[test]
    fn reopen_keeps_existing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let db = Database::new(Some(path.clone())).unwrap();
            db.set_focus_mode(true).unwrap();
            db.set_focus_interval_ms(5_000).unwrap();
        }
        let db = Database::new(Some(path)).unwrap();
        let settings = db.get_settings().unwrap();
        assert!(settings.focus_mode);
        assert_eq!(settings.focus_interval_ms, 5_000);
    }

    #[test]
    fn reading_list_preserves_append_order() {
        let (_dir, db) = open_temp_db();
        for i in 0..5 {
            let entry = ReadingListEntry::new(
                format!("https://example.com/{i}"),
                format!("Page {i}"),
            );
            db.append_reading_entry(&entry).unwrap();
        }
        let entries = db.reading_list().unwrap();
        assert_eq!(entries.len(), 5);
        let urls: Vec<_> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/0",
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3",
                "https://example.com/4",
            ]
        );
    }

    #[test]
    fn appends_interleaved_with_reads_lose_nothing() {
        let (_dir, db) = open_temp_db();
        for i in 0..10 {
            let entry =
                ReadingListEntry::new(format!("https://example.com/{i}"), String::new());
            db.append_reading_entry(&entry).unwrap();
            // Unrelated reads between appends must not clobber the list
            let _ = db.get_settings().unwrap();
            assert_eq!(db.reading_list().unwrap().len(), i + 1);
        }
    }

    #[test]
    fn blocked_site_roundtrip() {
        let (_dir, db) = open_temp_db();
        db.add_blocked_site("news.ycombinator.com").unwrap();
        db.add_blocked_site("news.ycombinator.com").unwrap();
        assert_eq!(
            db.get_settings().unwrap().blocked_sites,
            vec!["news.ycombinator.com"]
        );
        db.remove_blocked_site("news.ycombinator.com").unwrap();
        assert!(db.get_settings().unwrap().blocked_sites.is_empty());
    }

    #[test]
    fn safe_site_roundtrip() {
        let (_dir, db) = open_temp_db();
        db.add_safe_site("music.youtube.com").unwrap();
        assert_eq!(
            db.get_settings().unwrap().safe_sites,
            vec!["music.youtube.com"]
        );
        db.remove_safe_site("music.youtube.com").unwrap();
        assert!(db.get_settings().unwrap().safe_sites.is_empty());
    }

    #[test]
    fn zero_interval_rejected() {
        let (_dir, db) = open_temp_db();
        assert!(db.set_focus_interval_ms(0).is_err());
        assert_eq!(
            db.get_settings().unwrap().focus_interval_ms,
            crate::DEFAULT_FOCUS_INTERVAL_MS
        );
    }
}
