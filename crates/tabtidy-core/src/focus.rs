use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tabtidy_storage::Database;
use tokio::{sync::watch, task::JoinHandle, time::interval};

use crate::sweeper::Sweeper;

struct FocusTimer {
    task: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

/// State machine owning the recurring sweep timer. Sole writer of the timer
/// handle; at most one timer is ever live per process. The handle itself is
/// never persisted - after a restart, `restore` re-derives it from the
/// stored settings.
pub struct FocusModeController {
    database: Arc<Database>,
    sweeper: Arc<Sweeper>,
    timer: Option<FocusTimer>,
}

impl FocusModeController {
    #[must_use]
    pub fn new(database: Arc<Database>, sweeper: Arc<Sweeper>) -> Self {
        Self {
            database,
            sweeper,
            timer: None,
        }
    }

    /// Enable focus mode: persist the setting, sweep once immediately, then
    /// sweep every `interval_ms`. A missing interval reuses the stored one.
    /// Re-activation cancels the previous timer before installing the new
    /// one, so calling this twice never leaves two timers running.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is zero or persistence fails
    pub async fn activate(&mut self, interval_ms: Option<u64>) -> Result<()> {
        let interval_ms = match interval_ms {
            Some(ms) => ms,
            None => self.database.get_settings()?.focus_interval_ms,
        };
        self.database.set_focus_interval_ms(interval_ms)?;
        self.database.set_focus_mode(true)?;

        self.cancel_timer();

        if let Err(e) = self.sweeper.sweep_all().await {
            log::error!("Initial focus sweep failed: {e}");
        }

        let sweeper = self.sweeper.clone();
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(interval_ms));
            // The first tick completes immediately; activation already swept
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = cancel_rx.changed() => break,
                }
                if *cancel_rx.borrow_and_update() {
                    break;
                }
                // Not cancellable mid-run: a sweep that has started always
                // completes
                if let Err(e) = sweeper.sweep_all().await {
                    log::error!("Periodic sweep failed: {e}");
                }
                if *cancel_rx.borrow_and_update() {
                    break;
                }
            }
        });
        self.timer = Some(FocusTimer {
            task,
            cancel: cancel_tx,
        });

        log::info!("Focus mode activated, sweeping every {interval_ms}ms");
        Ok(())
    }

    /// Disable focus mode and cancel the timer. Already-closed tabs and the
    /// reading list are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails
    pub fn deactivate(&mut self) -> Result<()> {
        self.database.set_focus_mode(false)?;
        self.cancel_timer();
        log::info!("Focus mode deactivated");
        Ok(())
    }

    /// Startup recovery: timer handles do not survive a restart, so re-derive
    /// from persisted settings whether one should be running.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read or activation fails
    pub async fn restore(&mut self) -> Result<()> {
        let settings = self.database.get_settings()?;
        if settings.focus_mode {
            log::info!(
                "Focus mode was enabled before restart, resuming with {}ms interval",
                settings.focus_interval_ms
            );
            self.activate(Some(settings.focus_interval_ms)).await?;
        }
        Ok(())
    }

    /// Cancel the timer without touching persisted state. Used at process
    /// shutdown so focus mode resumes via `restore` on the next start.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.task.is_finished())
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            // Signal rather than abort so an in-flight sweep finishes cleanly
            let _ = timer.cancel.send(true);
        }
    }
}
