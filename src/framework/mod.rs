//! Control flow for transactions that talk to a remote service.
//!
//! A transaction returns a [`StateResult`]: [`StateError::Retry`] asks the caller to try again, [`StateError::Cancelled`] asks it to give up.
//! [`run_with_retry`] loops a transaction until it succeeds, is cancelled, or runs out of retries.

#![cfg(feature = "framework")]

mod retry;
mod state;

pub use retry::*;
pub use state::*;
