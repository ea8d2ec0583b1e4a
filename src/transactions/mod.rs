//! Pre-made transactions.

#![cfg(feature = "transactions")]

mod delete_workflow_run;
mod fetch_workflow_runs;
mod purge;

#[cfg(test)]
mod fake;

pub use delete_workflow_run::*;
pub use fetch_workflow_runs::*;
pub use purge::*;
