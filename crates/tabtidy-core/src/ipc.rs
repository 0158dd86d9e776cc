use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tabtidy_storage::{Database, ReadingListEntry};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::Mutex,
};

use crate::{
    browser::BrowserSession, duplicates::find_duplicates, focus::FocusModeController,
    sweeper::Sweeper,
};

/// Control-surface request from CLI to daemon
#[derive(Serialize, Deserialize, Debug)]
pub enum IpcRequest {
    /// Enable focus mode; a missing interval reuses the stored one
    ActivateFocusMode { interval_ms: Option<u64> },
    DeactivateFocusMode,
    /// Run one full duplicate sweep
    CloseDuplicates,
    GetReadingList,
    Status,
    Shutdown,
}

/// Control-surface response from daemon to CLI
#[derive(Serialize, Deserialize, Debug)]
pub enum IpcResponse {
    Ok,
    DuplicatesClosed {
        closed: usize,
    },
    /// Reading-list snapshot in append order, most-recent-last
    ReadingList {
        entries: Vec<ReadingListEntry>,
    },
    Status {
        focus_mode: bool,
        focus_interval_ms: u64,
        open_tabs: usize,
        duplicate_domains: Vec<String>,
    },
    Shutdown,
    Error {
        message: String,
    },
}

#[derive(Debug)]
pub struct IpcClient {
    sock_path: PathBuf,
}

impl IpcClient {
    #[must_use]
    pub fn new(sock_path: &Path) -> Self {
        Self {
            sock_path: sock_path.to_path_buf(),
        }
    }

    /// Send one request and wait for the response
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon socket is unreachable or the exchange
    /// fails to encode/decode
    pub async fn send_command(&self, request: IpcRequest) -> Result<IpcResponse> {
        let mut stream = UnixStream::connect(&self.sock_path).await?;

        let encoded = bincode::serialize(&request)?;
        stream.write_all(&encoded).await?;
        stream.shutdown().await?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;
        let response: IpcResponse = bincode::deserialize(&buffer)?;

        Ok(response)
    }
}

pub struct DaemonIpcHandler {
    database: Arc<Database>,
    browser: Arc<dyn BrowserSession>,
    sweeper: Arc<Sweeper>,
    controller: Arc<Mutex<FocusModeController>>,
    shutdown_signal: Arc<AtomicBool>,
}

impl DaemonIpcHandler {
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        browser: Arc<dyn BrowserSession>,
        sweeper: Arc<Sweeper>,
        controller: Arc<Mutex<FocusModeController>>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            database,
            browser,
            sweeper,
            controller,
            shutdown_signal,
        }
    }

    async fn dispatch(&self, request: IpcRequest) -> Result<IpcResponse> {
        match request {
            IpcRequest::ActivateFocusMode { interval_ms } => {
                self.controller.lock().await.activate(interval_ms).await?;
                Ok(IpcResponse::Ok)
            }
            IpcRequest::DeactivateFocusMode => {
                self.controller.lock().await.deactivate()?;
                Ok(IpcResponse::Ok)
            }
            IpcRequest::CloseDuplicates => {
                let closed = self.sweeper.sweep_duplicates().await?;
                Ok(IpcResponse::DuplicatesClosed { closed })
            }
            IpcRequest::GetReadingList => Ok(IpcResponse::ReadingList {
                entries: self.database.reading_list()?,
            }),
            IpcRequest::Status => {
                let settings = self.database.get_settings()?;
                // Status stays best-effort even if the browser is unreachable
                let tabs = self.browser.list_tabs().await.unwrap_or_default();
                let report = find_duplicates(&tabs);
                Ok(IpcResponse::Status {
                    focus_mode: settings.focus_mode,
                    focus_interval_ms: settings.focus_interval_ms,
                    open_tabs: tabs.len(),
                    duplicate_domains: report.duplicate_domains,
                })
            }
            IpcRequest::Shutdown => {
                self.shutdown_signal.store(true, Ordering::SeqCst);
                Ok(IpcResponse::Shutdown)
            }
        }
    }

    /// Handle one decoded request and write the response back
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be encoded or written
    pub async fn handle(&self, stream: &mut UnixStream, request: IpcRequest) -> Result<()> {
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => IpcResponse::Error {
                message: format!("{e:#}"),
            },
        };

        let encoded = bincode::serialize(&response)?;
        stream.write_all(&encoded).await?;
        Ok(())
    }
}

/// Accept loop for the daemon's unix socket
///
/// # Errors
///
/// Returns an error if the socket cannot be bound
pub async fn listen(handler: Arc<DaemonIpcHandler>, sock_path: &Path) -> io::Result<()> {
    if sock_path.exists() {
        fs::remove_file(sock_path)?;
    }
    let listener = UnixListener::bind(sock_path)?;

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0; 1024];
                    match stream.read(&mut buf).await {
                        Ok(n) if n > 0 => match bincode::deserialize::<IpcRequest>(&buf[..n]) {
                            Ok(request) => {
                                if let Err(e) = handler.handle(&mut stream, request).await {
                                    log::error!("IPC handle error: {e}");
                                }
                            }
                            Err(e) => {
                                log::error!("IPC deserialize error: {e}");
                            }
                        },
                        Ok(_) => {} // Connection closed
                        Err(e) => {
                            log::error!("IPC read error: {e}");
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("IPC accept error: {e}");
            }
        }
    }
}
