use std::sync::Arc;
use tabtidy_storage::{Database, ReadingListEntry};
use tokio::sync::Mutex;

use crate::{
    browser::{BrowserSession, Tab},
    notify::Notifier,
};

/// Outcome of a single safe-close attempt. Per-tab failures are outcomes,
/// not errors; a batch caller keeps going regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Archived to the reading list, then removed
    Closed,
    /// Tab is playing audio; left open, nothing archived
    SkippedAudible,
    /// Reading-list append failed; tab left open, no removal attempted
    ArchiveFailed,
    /// Archived, but the removal request failed. The entry stays in the
    /// reading list; at worst a tab is archived-but-open.
    RemoveFailed,
}

impl CloseOutcome {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// The only component that mutates both the store and live tab state.
/// Enforces the audio guard and the archive-before-close safety net.
pub struct SafeCloseExecutor {
    database: Arc<Database>,
    browser: Arc<dyn BrowserSession>,
    notifier: Arc<dyn Notifier>,
    // Serializes whole archive+close operations so a real-time close can
    // never interleave with an in-flight sweep close
    close_lock: Mutex<()>,
}

impl SafeCloseExecutor {
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        browser: Arc<dyn BrowserSession>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            database,
            browser,
            notifier,
            close_lock: Mutex::new(()),
        }
    }

    /// Archive a tab to the reading list, then request its removal. The
    /// append must be durable before the removal request goes out; a failed
    /// append means the tab stays open.
    ///
    /// Archiving cannot wait on confirmation that the tab still exists, so a
    /// stale request for a tab something else already closed appends a second
    /// entry and then reports [`CloseOutcome::RemoveFailed`]. The reading
    /// list tolerates such duplicates; losing an entry would not.
    pub async fn safe_close(&self, tab: &Tab) -> CloseOutcome {
        if tab.audible {
            log::debug!("Refusing to close audible tab: {}", tab.url);
            return CloseOutcome::SkippedAudible;
        }

        let _guard = self.close_lock.lock().await;

        let entry = ReadingListEntry::new(tab.url.clone(), tab.title.clone());
        if let Err(e) = self.database.append_reading_entry(&entry) {
            log::warn!("Failed to archive {} to reading list: {e}", tab.url);
            return CloseOutcome::ArchiveFailed;
        }

        if let Err(e) = self.browser.close_tab(&tab.id).await {
            // Often just a tab that a concurrent pass already closed
            log::debug!("Removal request for {} failed: {e}", tab.id);
            return CloseOutcome::RemoveFailed;
        }

        if let Err(e) = self
            .notifier
            .notify(&format!("Saved \"{}\" to reading list", tab.title))
        {
            log::debug!("Notification failed: {e}");
        }

        CloseOutcome::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{audible_tab, tab, MemoryBrowser};
    use crate::notify::LogNotifier;

    fn executor_with(
        tabs: Vec<Tab>,
    ) -> (tempfile::TempDir, Arc<MemoryBrowser>, SafeCloseExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(Some(dir.path().join("test.db"))).unwrap());
        let browser = Arc::new(MemoryBrowser::new(tabs));
        let executor =
            SafeCloseExecutor::new(db, browser.clone(), Arc::new(LogNotifier));
        (dir, browser, executor)
    }

    #[tokio::test]
    async fn closes_and_archives_in_order() {
        let target = tab("1", "https://example.com/article");
        let (_dir, browser, executor) = executor_with(vec![target.clone()]);

        let outcome = executor.safe_close(&target).await;
        assert_eq!(outcome, CloseOutcome::Closed);
        assert!(browser.open_tabs().is_empty());

        let entries = executor.database.reading_list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/article");
    }

    #[tokio::test]
    async fn audible_tab_is_never_closed_or_archived() {
        let target = audible_tab("1", "https://reddit.com/r/foo");
        let (_dir, browser, executor) = executor_with(vec![target.clone()]);

        let outcome = executor.safe_close(&target).await;
        assert_eq!(outcome, CloseOutcome::SkippedAudible);
        assert_eq!(browser.open_tabs().len(), 1);
        assert!(executor.database.reading_list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_removal_keeps_archive_entry() {
        let target = tab("1", "https://example.com/");
        let (_dir, browser, executor) = executor_with(vec![target.clone()]);
        browser.set_fail_close(true);

        let outcome = executor.safe_close(&target).await;
        assert_eq!(outcome, CloseOutcome::RemoveFailed);
        // Archived-but-open: data is never lost
        assert_eq!(browser.open_tabs().len(), 1);
        assert_eq!(executor.database.reading_list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_close_of_a_gone_tab_archives_again() {
        let target = tab("1", "https://example.com/article");
        let (_dir, browser, executor) = executor_with(vec![target.clone()]);

        assert_eq!(executor.safe_close(&target).await, CloseOutcome::Closed);

        // A watcher event for the same tab can land after a sweep closed it;
        // the URL is archived a second time before the removal fails
        assert_eq!(executor.safe_close(&target).await, CloseOutcome::RemoveFailed);
        assert!(browser.open_tabs().is_empty());
        assert_eq!(executor.database.reading_list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sequential_closes_grow_list_by_exactly_n() {
        let tabs: Vec<Tab> = (0..4)
            .map(|i| tab(&i.to_string(), &format!("https://example.com/{i}")))
            .collect();
        let (_dir, _browser, executor) = executor_with(tabs.clone());

        for t in &tabs {
            assert!(executor.safe_close(t).await.is_closed());
        }
        assert_eq!(executor.database.reading_list().unwrap().len(), 4);
    }
}
