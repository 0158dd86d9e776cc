pub mod db;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use models::{ReadingListEntry, Settings, DEFAULT_FOCUS_INTERVAL_MS};
