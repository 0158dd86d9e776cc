use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub mod devtools;

/// Snapshot of one open tab. Owned by the browser session; the core never
/// mutates a tab, it only requests closure by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub url: String,
    pub title: String,
    pub audible: bool,
}

/// Tab lifecycle events the real-time watcher subscribes to
#[derive(Debug, Clone)]
pub enum TabEvent {
    Created(Tab),
    Navigated(Tab),
}

impl TabEvent {
    /// The tab the event is about
    #[must_use]
    pub fn tab(&self) -> &Tab {
        match self {
            Self::Created(tab) | Self::Navigated(tab) => tab,
        }
    }
}

/// Browser session collaborator
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Snapshot all currently open tabs
    async fn list_tabs(&self) -> Result<Vec<Tab>>;

    /// Request removal of a tab. Fails if the tab no longer exists.
    async fn close_tab(&self, tab_id: &str) -> Result<()>;

    /// Start emitting tab lifecycle events. The returned channel closes when
    /// the session ends.
    fn subscribe(&self) -> mpsc::Receiver<TabEvent>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{BrowserSession, Tab, TabEvent};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };
    use tokio::sync::mpsc;

    /// In-process fake browser for exercising sweeps and closes
    pub struct MemoryBrowser {
        tabs: Mutex<Vec<Tab>>,
        list_calls: AtomicUsize,
        fail_close: AtomicBool,
        events: Mutex<Option<mpsc::Sender<TabEvent>>>,
    }

    impl MemoryBrowser {
        pub fn new(tabs: Vec<Tab>) -> Self {
            Self {
                tabs: Mutex::new(tabs),
                list_calls: AtomicUsize::new(0),
                fail_close: AtomicBool::new(false),
                events: Mutex::new(None),
            }
        }

        pub fn open_tabs(&self) -> Vec<Tab> {
            self.tabs.lock().unwrap().clone()
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        pub fn set_fail_close(&self, fail: bool) {
            self.fail_close.store(fail, Ordering::SeqCst);
        }

        pub async fn emit(&self, event: TabEvent) {
            let sender = self.events.lock().unwrap().clone();
            if let Some(sender) = sender {
                sender.send(event).await.unwrap();
            }
        }
    }

    #[async_trait]
    impl BrowserSession for MemoryBrowser {
        async fn list_tabs(&self) -> Result<Vec<Tab>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tabs.lock().unwrap().clone())
        }

        async fn close_tab(&self, tab_id: &str) -> Result<()> {
            if self.fail_close.load(Ordering::SeqCst) {
                anyhow::bail!("close refused");
            }
            let mut tabs = self.tabs.lock().unwrap();
            let before = tabs.len();
            tabs.retain(|t| t.id != tab_id);
            anyhow::ensure!(tabs.len() < before, "no such tab: {tab_id}");
            Ok(())
        }

        fn subscribe(&self) -> mpsc::Receiver<TabEvent> {
            let (tx, rx) = mpsc::channel(32);
            *self.events.lock().unwrap() = Some(tx);
            rx
        }
    }

    pub fn tab(id: &str, url: &str) -> Tab {
        Tab {
            id: id.to_string(),
            url: url.to_string(),
            title: format!("Title of {url}"),
            audible: false,
        }
    }

    pub fn audible_tab(id: &str, url: &str) -> Tab {
        Tab {
            audible: true,
            ..tab(id, url)
        }
    }
}
