use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default period between focus-mode sweeps.
pub const DEFAULT_FOCUS_INTERVAL_MS: u64 = 60_000;

/// Reading-list entry - the archived copy of a tab made just before closing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingListEntry {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

impl ReadingListEntry {
    #[must_use]
    pub fn new(url: String, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            title,
            saved_at: Utc::now(),
        }
    }
}

/// Persisted policy settings - single row, established with defaults on first open
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub focus_mode: bool,
    pub focus_interval_ms: u64,
    /// User additions to the built-in block list (domain substrings)
    pub blocked_sites: Vec<String>,
    /// Allow-list overrides; a match here always wins over the block list
    pub safe_sites: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_mode: false,
            focus_interval_ms: DEFAULT_FOCUS_INTERVAL_MS,
            blocked_sites: Vec::new(),
            safe_sites: Vec::new(),
        }
    }
}
