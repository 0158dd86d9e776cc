use anyhow::Result;
use std::sync::Arc;
use tabtidy_storage::Database;

use crate::{
    browser::TabEvent,
    classifier::{BlockedSitePolicy, DistractionClassifier},
    executor::SafeCloseExecutor,
};

/// Applies the blocked-site policy to tabs as they are created or navigate,
/// independent of the periodic sweep timer.
pub struct TabWatcher {
    database: Arc<Database>,
    executor: Arc<SafeCloseExecutor>,
}

impl TabWatcher {
    #[must_use]
    pub fn new(database: Arc<Database>, executor: Arc<SafeCloseExecutor>) -> Self {
        Self { database, executor }
    }

    /// Handle one tab lifecycle event. Does nothing unless focus mode is
    /// enabled. A close that fails because a concurrent sweep got there
    /// first is logged and not retried.
    ///
    /// # Errors
    ///
    /// Returns an error only if the persisted policy cannot be read
    pub async fn handle_event(&self, event: &TabEvent) -> Result<()> {
        let settings = self.database.get_settings()?;
        if !settings.focus_mode {
            return Ok(());
        }

        let tab = event.tab();
        let classifier = DistractionClassifier::new(BlockedSitePolicy::from_settings(&settings));
        if classifier.is_distracting(tab) {
            let outcome = self.executor.safe_close(tab).await;
            log::debug!("Real-time close of {}: {outcome:?}", tab.url);
        }
        Ok(())
    }
}
