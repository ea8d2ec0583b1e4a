//! A loop that repeats a transaction until it succeeds, is cancelled, or runs out of retries.

use super::{StateError, StateResult, retry_if_possible};

use std::time::Duration;

use tracing::{debug, error, info};

/// How often and how patiently a transaction is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u8,
    /// The delay before the first retry. The n-th retry waits n times as long.
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NEVER: Self = Self {
        max_retries: 0,
        delay: Duration::ZERO,
    };
}

#[cfg(feature = "env_max_retries")]
impl Default for RetryPolicy {
    /// Reads `MAX_RETRIES` and `RETRY_DELAY_MS`.
    fn default() -> Self {
        Self {
            max_retries: *crate::env::MAX_RETRIES,
            delay: Duration::from_millis(*crate::env::RETRY_DELAY_MS),
        }
    }
}

/// Runs a transaction, retrying it while it fails with [`StateError::Retry`].
///
/// The name is only used for logging.
///
/// # Errors
///
/// Returns the last error if the transaction is cancelled or the retry limit is exceeded.
pub async fn run_with_retry<T, F, Fut>(name: &str, policy: RetryPolicy, mut f: F) -> StateResult<T>
where
    T: Send,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = StateResult<T>> + Send,
{
    debug!("starting transaction {name}…");
    let mut retry: u8 = 0;

    loop {
        match f().await {
            Ok(value) => {
                if retry > 0 {
                    info!("transaction {name} succeeded after {retry} retries");
                }
                return Ok(value);
            }
            Err(StateError::Retry(err)) => match retry_if_possible(&mut retry, policy.max_retries) {
                Ok(_) => {
                    tokio::time::sleep(policy.delay * u32::from(retry)).await;
                    continue;
                }
                Err(_) => {
                    error!("transaction {name} failed: {err:#}");
                    return Err(StateError::Retry(err));
                }
            },
            Err(err) => {
                error!("transaction {name} failed: {err}");
                return Err(err);
            }
        }
    }
}
