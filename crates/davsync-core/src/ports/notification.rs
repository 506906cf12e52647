//! Completion notifier port (driven/secondary port)
//!
//! Fired once after a run that finished without a fatal error, e.g. to
//! tell a service that its files were replaced. The engine treats any
//! error from the notifier as a logged failure that does not change the
//! run's status.

use serde::{Deserialize, Serialize};

/// Result of the post-run notification step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// No notifier configured
    NotConfigured,
    /// The run failed, so nothing was sent
    Skipped,
    /// The notifier acknowledged the signal
    Sent,
    /// The notifier failed; the message explains why
    Failed(String),
}

impl std::fmt::Display for NotificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationOutcome::NotConfigured => write!(f, "not configured"),
            NotificationOutcome::Skipped => write!(f, "skipped (run failed)"),
            NotificationOutcome::Sent => write!(f, "sent"),
            NotificationOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Port trait for the post-sync signal
#[async_trait::async_trait]
pub trait ICompletionNotifier: Send + Sync {
    /// Sends the completion signal
    ///
    /// Returns `Ok(())` only when the receiver acknowledged it.
    async fn notify_completion(&self) -> anyhow::Result<()>;
}
