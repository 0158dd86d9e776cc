use anyhow::Result;
use tabtidy_storage::{Database, Settings};

use crate::browser::Tab;

/// Built-in distraction domains, always part of the effective block list
pub const DEFAULT_BLOCKED_SITES: &[&str] = &[
    "twitter.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "reddit.com",
    "youtube.com",
];

/// Blocked-site policy: built-in defaults plus the user block list, with an
/// allow list that always wins
#[derive(Debug, Clone, Default)]
pub struct BlockedSitePolicy {
    pub user_blocked: Vec<String>,
    pub safe_excludes: Vec<String>,
}

impl BlockedSitePolicy {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            user_blocked: settings.blocked_sites.clone(),
            safe_excludes: settings.safe_sites.clone(),
        }
    }

    fn effective_block_list(&self) -> impl Iterator<Item = &str> {
        DEFAULT_BLOCKED_SITES
            .iter()
            .copied()
            .chain(self.user_blocked.iter().map(String::as_str))
    }
}

/// Decides whether a tab matches the blocked-site policy. Pure; the policy
/// is loaded once and the checks are plain substring matches.
pub struct DistractionClassifier {
    policy: BlockedSitePolicy,
}

impl DistractionClassifier {
    #[must_use]
    pub fn new(policy: BlockedSitePolicy) -> Self {
        Self { policy }
    }

    /// Build a classifier from the currently persisted policy
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read
    pub fn from_database(db: &Database) -> Result<Self> {
        let settings = db.get_settings()?;
        Ok(Self::new(BlockedSitePolicy::from_settings(&settings)))
    }

    /// True iff the tab's URL matches the effective block list. Non-web
    /// schemes never match, and the allow list is checked before the block
    /// list so a tab matching both stays open.
    #[must_use]
    pub fn is_distracting(&self, tab: &Tab) -> bool {
        if tab.url.is_empty() {
            return false;
        }
        if !tab.url.starts_with("http://") && !tab.url.starts_with("https://") {
            return false;
        }
        if self
            .policy
            .safe_excludes
            .iter()
            .any(|safe| tab.url.contains(safe.as_str()))
        {
            return false;
        }
        self.policy
            .effective_block_list()
            .any(|blocked| tab.url.contains(blocked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::tab;

    #[test]
    fn default_block_list_matches() {
        let classifier = DistractionClassifier::new(BlockedSitePolicy::default());
        assert!(classifier.is_distracting(&tab("1", "https://www.reddit.com/r/rust")));
        assert!(classifier.is_distracting(&tab("2", "https://youtube.com/watch?v=abc")));
        assert!(!classifier.is_distracting(&tab("3", "https://docs.rs/tokio")));
    }

    #[test]
    fn user_blocked_sites_extend_defaults() {
        let classifier = DistractionClassifier::new(BlockedSitePolicy {
            user_blocked: vec!["news.ycombinator.com".to_string()],
            safe_excludes: Vec::new(),
        });
        assert!(classifier.is_distracting(&tab("1", "https://news.ycombinator.com/item?id=1")));
        assert!(classifier.is_distracting(&tab("2", "https://reddit.com/")));
    }

    #[test]
    fn allow_list_wins_over_block_list() {
        let classifier = DistractionClassifier::new(BlockedSitePolicy {
            user_blocked: Vec::new(),
            safe_excludes: vec!["music.youtube.com".to_string()],
        });
        // Matches both lists; the allow list short-circuits first
        assert!(!classifier.is_distracting(&tab("1", "https://music.youtube.com/playlist")));
        assert!(classifier.is_distracting(&tab("2", "https://www.youtube.com/feed")));
    }

    #[test]
    fn non_web_schemes_are_never_distracting() {
        let classifier = DistractionClassifier::new(BlockedSitePolicy::default());
        assert!(!classifier.is_distracting(&tab("1", "")));
        assert!(!classifier.is_distracting(&tab("2", "chrome://settings")));
        assert!(!classifier.is_distracting(&tab("3", "about:blank")));
        assert!(!classifier.is_distracting(&tab("4", "file:///tmp/reddit.com.html")));
    }
}
