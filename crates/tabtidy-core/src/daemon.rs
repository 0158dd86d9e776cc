use anyhow::Result;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tabtidy_storage::Database;
use tokio::sync::Mutex;

use crate::{
    browser::BrowserSession,
    config::get_data_dir,
    executor::SafeCloseExecutor,
    focus::FocusModeController,
    ipc::{listen, DaemonIpcHandler},
    notify::{LogNotifier, Notifier},
    sweeper::Sweeper,
    watcher::TabWatcher,
};

/// Wires the policy engine to one browser session: real-time events feed the
/// watcher, the focus controller owns the sweep timer, and the IPC listener
/// exposes the control surface.
pub struct Daemon {
    browser: Arc<dyn BrowserSession>,
    watcher: TabWatcher,
    controller: Arc<Mutex<FocusModeController>>,
    ipc_handler: Arc<DaemonIpcHandler>,
    shutdown_signal: Arc<AtomicBool>,
}

impl Daemon {
    #[must_use]
    pub fn new(db: Database, browser: Arc<dyn BrowserSession>) -> Self {
        let database = Arc::new(db);
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        let executor = Arc::new(SafeCloseExecutor::new(
            database.clone(),
            browser.clone(),
            notifier,
        ));
        let sweeper = Arc::new(Sweeper::new(
            database.clone(),
            browser.clone(),
            executor.clone(),
        ));
        let controller = Arc::new(Mutex::new(FocusModeController::new(
            database.clone(),
            sweeper.clone(),
        )));
        let watcher = TabWatcher::new(database.clone(), executor);
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let ipc_handler = Arc::new(DaemonIpcHandler::new(
            database,
            browser.clone(),
            sweeper,
            controller.clone(),
            shutdown_signal.clone(),
        ));

        Self {
            browser,
            watcher,
            controller,
            ipc_handler,
            shutdown_signal,
        }
    }

    /// Run until Ctrl-C or an IPC shutdown request
    ///
    /// # Errors
    ///
    /// Returns an error if startup recovery or the data directory fails
    pub async fn run_with_signals(&mut self) -> Result<()> {
        let sock_path = get_data_dir()?.join("tabtidy.sock");
        let ipc_handler = self.ipc_handler.clone();

        tokio::spawn(async move {
            if let Err(e) = listen(ipc_handler, &sock_path).await {
                log::error!("IPC listener failed: {e}");
            }
        });

        // Timer handles do not survive restarts; re-derive from settings
        self.controller.lock().await.restore().await?;

        let mut events = self.browser.subscribe();
        log::info!("Daemon started with signal handling and IPC");

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => {
                            if let Err(e) = self.watcher.handle_event(&event).await {
                                log::error!("Tab event handling failed: {e}");
                            }
                        }
                        None => {
                            log::warn!("Tab event stream closed; browser session ended");
                            break;
                        }
                    }
                }
                // Housekeeping tick so IPC shutdown requests are noticed
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received Ctrl-C, shutting down...");
                    self.shutdown_signal.store(true, Ordering::SeqCst);
                }
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                break;
            }
        }

        // Cancel the timer but leave persisted settings alone; restore()
        // re-arms focus mode on the next start
        self.controller.lock().await.shutdown();
        log::info!("Daemon shut down gracefully.");
        Ok(())
    }
}
