use super::{BrowserSession, Tab, TabEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};
use tokio::sync::mpsc;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Tab target as reported by the remote-debugging JSON endpoint
#[derive(Debug, Deserialize)]
struct TargetInfo {
    id: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    /// Not every endpoint reports audio state; missing means silent
    #[serde(default)]
    audible: bool,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Browser session over the DevTools-style remote-debugging HTTP endpoint
/// (`--remote-debugging-port`). The plain JSON endpoint has no push channel,
/// so lifecycle events are synthesized by diffing successive snapshots.
pub struct DevtoolsBrowser {
    endpoint: String,
    client: reqwest::Client,
    poll_interval: Duration,
}

impl DevtoolsBrowser {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

async fn fetch_tabs(client: &reqwest::Client, endpoint: &str) -> Result<Vec<Tab>> {
    let targets: Vec<TargetInfo> = client
        .get(format!("{endpoint}/json/list"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("Malformed target list from debugging endpoint")?;

    Ok(targets
        .into_iter()
        .filter(|t| t.kind == "page")
        .map(|t| Tab {
            id: t.id,
            url: t.url,
            title: t.title,
            audible: t.audible,
        })
        .collect())
}

#[async_trait]
impl BrowserSession for DevtoolsBrowser {
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        fetch_tabs(&self.client, &self.endpoint).await
    }

    async fn close_tab(&self, tab_id: &str) -> Result<()> {
        self.client
            .get(format!("{}/json/close/{tab_id}", self.endpoint))
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Browser refused to close tab {tab_id}"))?;
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<TabEvent> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            // id -> last seen url; the first snapshot only primes this map,
            // tabs open before subscription are not "created"
            let mut known: HashMap<String, String> = HashMap::new();
            let mut primed = false;

            loop {
                interval.tick().await;
                let tabs = match fetch_tabs(&client, &endpoint).await {
                    Ok(tabs) => tabs,
                    Err(e) => {
                        log::debug!("Tab poll failed: {e}");
                        continue;
                    }
                };

                let mut next = HashMap::with_capacity(tabs.len());
                for tab in tabs {
                    let event = match known.get(&tab.id) {
                        None if primed => Some(TabEvent::Created(tab.clone())),
                        Some(prev) if *prev != tab.url => Some(TabEvent::Navigated(tab.clone())),
                        _ => None,
                    };
                    next.insert(tab.id.clone(), tab.url.clone());
                    if let Some(event) = event {
                        if tx.send(event).await.is_err() {
                            // Subscriber dropped, stop polling
                            return;
                        }
                    }
                }
                known = next;
                primed = true;
            }
        });

        rx
    }
}
