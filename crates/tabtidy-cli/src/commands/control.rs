/// Focus-mode and duplicate-sweep commands sent over IPC
use anyhow::Result;
use std::path::Path;
use tabtidy_core::ipc::{IpcClient, IpcRequest, IpcResponse};

fn client(data_dir: &Path) -> Result<IpcClient> {
    let sock_path = data_dir.join("tabtidy.sock");
    anyhow::ensure!(
        sock_path.exists(),
        "Daemon is not running. Start it with `tabtidy start`."
    );
    Ok(IpcClient::new(&sock_path))
}

pub async fn focus_on(data_dir: &Path, interval_ms: Option<u64>) -> Result<()> {
    let response = client(data_dir)?
        .send_command(IpcRequest::ActivateFocusMode { interval_ms })
        .await?;
    match response {
        IpcResponse::Ok => {
            println!("Focus mode activated. Distracting tabs are being swept.");
            Ok(())
        }
        IpcResponse::Error { message } => anyhow::bail!("Daemon error: {message}"),
        resp => anyhow::bail!("Unexpected response from daemon: {resp:?}"),
    }
}

pub async fn focus_off(data_dir: &Path) -> Result<()> {
    let response = client(data_dir)?
        .send_command(IpcRequest::DeactivateFocusMode)
        .await?;
    match response {
        IpcResponse::Ok => {
            println!("Focus mode deactivated.");
            Ok(())
        }
        IpcResponse::Error { message } => anyhow::bail!("Daemon error: {message}"),
        resp => anyhow::bail!("Unexpected response from daemon: {resp:?}"),
    }
}

pub async fn close_duplicates(data_dir: &Path) -> Result<()> {
    let response = client(data_dir)?
        .send_command(IpcRequest::CloseDuplicates)
        .await?;
    match response {
        IpcResponse::DuplicatesClosed { closed } => {
            if closed == 0 {
                println!("No duplicate tabs to close.");
            } else {
                println!("Closed {closed} duplicate tab(s); all archived to the reading list.");
            }
            Ok(())
        }
        IpcResponse::Error { message } => anyhow::bail!("Daemon error: {message}"),
        resp => anyhow::bail!("Unexpected response from daemon: {resp:?}"),
    }
}
