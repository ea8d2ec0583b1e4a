use thiserror::Error;
use tracing::{error, warn};

/// The result of a transaction.
pub type StateResult<T> = Result<T, StateError>;

/// Instructs the control flow after a failed transaction.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StateError {
    /// The control flow should retry if possible.
    ///
    /// See: [`retry_if_possible`]
    #[error("{0:#}")]
    Retry(anyhow::Error),
    /// The control flow should exit immediately.
    #[error("{0:#}")]
    Cancelled(anyhow::Error),
}

impl StateError {
    /// Whether retrying may succeed.
    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }
}

/// Decides whether retrying is allowed based on a provided retry times and a retry limit.
///
/// # Errors
///
/// Returns [`Err<()>`] if retrying is not allowed, otherwise [`Ok<()>`] is returned.
pub fn retry_if_possible(retry: &mut u8, max_retries: u8) -> Result<(), ()> {
    *retry = retry.saturating_add(1);
    if *retry > max_retries {
        error!("retried for too many times ({max_retries}), stopping!");
        Err(())
    } else {
        warn!("retrying… ({retry} / {max_retries})");
        Ok(())
    }
}
