//! Provides a shutdown signal to stop a purge between two deletions.
//!
//! See: [`signal`], [`subscribe`]

#![cfg(feature = "shutdown")]

use crate::static_lazy_lock;

use tokio::{signal, sync::watch};
use tracing::{error, warn};

static_lazy_lock! {
    /// The sender to stop the process. Holds `true` once a stop is requested.
    pub SHUTDOWN: watch::Sender<bool> = watch::Sender::new(false);
}

/// Subscribes to stop requests, e.g. for [`crate::transactions::PurgeOptions::stop`].
pub fn subscribe() -> watch::Receiver<bool> {
    SHUTDOWN.subscribe()
}

/// Requests a stop. The request in flight still finishes.
pub fn request() {
    SHUTDOWN.send_replace(true);
}

/// Whether a stop was requested.
pub fn requested() -> bool {
    *SHUTDOWN.borrow()
}

/// Waits for Ctrl + C, then requests a stop.
///
/// Nothing is requested if the signal handler cannot be installed.
pub async fn signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("received Ctrl + C, stopping after the current request…");
            request();
        }
        Err(err) => error!("failed to install Ctrl + C signal handler: {err}"),
    }
}
