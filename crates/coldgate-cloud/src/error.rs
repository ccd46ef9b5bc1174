//! Error type shared by every provider call.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for provider operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors surfaced by a provider control surface.
///
/// Callers must treat every variant as "status unknown", never as
/// "scaled to zero" — a failed lookup says nothing about capacity.
#[derive(Debug, Error)]
pub enum CloudError {
    /// A named group/service/rule does not exist at the provider.
    #[error("{0} not found")]
    NotFound(String),

    /// The provider call itself failed (network, throttling, permission).
    #[error("dependency unavailable: {0}")]
    Dependency(String),

    /// The operation exceeded its externally-imposed deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Run a provider operation under a deadline.
///
/// An elapsed deadline maps to [`CloudError::Timeout`] so callers handle
/// it like any other dependency failure.
pub async fn with_timeout<T>(
    deadline: Duration,
    fut: impl Future<Output = CloudResult<T>>,
) -> CloudResult<T> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(CloudError::Timeout(deadline)),
    }
}
