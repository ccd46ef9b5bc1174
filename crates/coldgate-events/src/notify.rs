//! Notification seam for scaling failures.

use async_trait::async_trait;
use tracing::warn;

/// Publishes operator-facing notifications (mail, chat, pager — whatever
/// the deployment wires in). Local mode logs them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> anyhow::Result<()>;
}

/// Notifier that writes to the log instead of an external channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, subject: &str, message: &str) -> anyhow::Result<()> {
        warn!(%subject, %message, "scaling notification");
        Ok(())
    }
}
