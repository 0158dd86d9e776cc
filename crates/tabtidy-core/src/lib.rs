pub mod browser;
pub mod classifier;
pub mod config;
pub mod daemon;
pub mod duplicates;
pub mod executor;
pub mod focus;
pub mod ipc;
pub mod notify;
pub mod sweeper;
pub mod watcher;

pub use browser::{BrowserSession, Tab, TabEvent};
pub use daemon::Daemon;
pub use executor::CloseOutcome;
