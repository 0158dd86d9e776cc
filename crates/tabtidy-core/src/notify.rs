use anyhow::Result;

/// Best-effort user notification channel. Callers ignore failures; a broken
/// notifier must never block a close.
pub trait Notifier: Send + Sync {
    /// Emit a short user-facing message
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is unavailable
    fn notify(&self, message: &str) -> Result<()>;
}

/// Notifier that writes to the log instead of raising desktop alerts
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        log::info!("{message}");
        Ok(())
    }
}
