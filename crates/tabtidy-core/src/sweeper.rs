use anyhow::Result;
use std::sync::Arc;
use tabtidy_storage::Database;

use crate::{
    browser::BrowserSession,
    classifier::DistractionClassifier,
    duplicates::find_duplicates,
    executor::SafeCloseExecutor,
};

/// Runs whole-snapshot policy passes. Each sweep takes its snapshot exactly
/// once and closes matches strictly one after another; a tab that fails to
/// close never stops the rest of the batch.
pub struct Sweeper {
    database: Arc<Database>,
    browser: Arc<dyn BrowserSession>,
    executor: Arc<SafeCloseExecutor>,
}

impl Sweeper {
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        browser: Arc<dyn BrowserSession>,
        executor: Arc<SafeCloseExecutor>,
    ) -> Self {
        Self {
            database,
            browser,
            executor,
        }
    }

    /// Close every open tab matching the blocked-site policy. The policy is
    /// re-read from the store so edits apply without a restart.
    ///
    /// # Errors
    ///
    /// Returns an error only if the snapshot or policy read fails
    pub async fn sweep_distractions(&self) -> Result<usize> {
        let classifier = DistractionClassifier::from_database(&self.database)?;
        let tabs = self.browser.list_tabs().await?;

        let mut closed = 0;
        for tab in &tabs {
            if classifier.is_distracting(tab) && self.executor.safe_close(tab).await.is_closed() {
                closed += 1;
            }
        }
        log::info!("Distraction sweep closed {closed} of {} tabs", tabs.len());
        Ok(closed)
    }

    /// Close every tab whose normalized URL already appeared earlier in the
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error only if the snapshot fails
    pub async fn sweep_duplicates(&self) -> Result<usize> {
        let tabs = self.browser.list_tabs().await?;
        let report = find_duplicates(&tabs);

        let mut closed = 0;
        for tab in &report.close {
            if self.executor.safe_close(tab).await.is_closed() {
                closed += 1;
            }
        }
        log::info!(
            "Duplicate sweep closed {closed} of {} duplicate tabs",
            report.close.len()
        );
        Ok(closed)
    }

    /// One full focus pass: distractions first, then duplicates
    ///
    /// # Errors
    ///
    /// Returns an error if either snapshot fails
    pub async fn sweep_all(&self) -> Result<usize> {
        let closed = self.sweep_distractions().await?;
        Ok(closed + self.sweep_duplicates().await?)
    }
}
