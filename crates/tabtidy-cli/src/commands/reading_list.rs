/// Reading-list display. Prefers the daemon's snapshot over IPC but falls
/// back to reading the database directly when the daemon is down.
use anyhow::Result;
use std::path::Path;
use tabled::{Table, Tabled};
use tabtidy_core::ipc::{IpcClient, IpcRequest, IpcResponse};
use tabtidy_storage::{Database, ReadingListEntry};

/// Safely truncate a string to a maximum number of characters (not bytes).
/// This avoids panics when slicing multi-byte UTF-8 characters.
fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
}

async fn fetch_entries(data_dir: &Path) -> Result<Vec<ReadingListEntry>> {
    let sock_path = data_dir.join("tabtidy.sock");
    if sock_path.exists() {
        match IpcClient::new(&sock_path)
            .send_command(IpcRequest::GetReadingList)
            .await
        {
            Ok(IpcResponse::ReadingList { entries }) => return Ok(entries),
            Ok(resp) => anyhow::bail!("Unexpected response from daemon: {resp:?}"),
            Err(e) => {
                log::warn!("Daemon not responding ({e}); reading directly from database");
            }
        }
    }
    Database::new(None)?.reading_list()
}

pub async fn show_reading_list(data_dir: &Path) -> Result<()> {
    let entries = fetch_entries(data_dir).await?;

    if entries.is_empty() {
        println!("Reading list is empty.");
        return Ok(());
    }

    let rows: Vec<ReadingRow> = entries
        .iter()
        .map(|entry| ReadingRow {
            saved: entry.saved_at.format("%Y-%m-%d %H:%M").to_string(),
            title: truncate_str(&entry.title, 48),
            url: truncate_str(&entry.url, 64),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("{} entries, oldest first.", entries.len());
    Ok(())
}
