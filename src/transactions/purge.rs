//! Deletes every run of a workflow.

use std::{collections::HashSet, fmt::Display};

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    framework::{RetryPolicy, StateResult},
    transactions::{MAX_PER_PAGE, delete_workflow_run, fetch_workflow_runs},
    workflow::{ActionsApi, Deletion, Repository, WorkflowRun},
};

/// What to do when deleting a run fails.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Records the failure and moves on to the next run.
    #[default]
    Continue,
    /// Stops at the first failure, skipping the remaining runs.
    FailFast,
}

/// Options of [`purge`].
#[derive(Debug, Clone)]
pub struct PurgeOptions {
    /// Runs per listing page, up to 100.
    pub per_page: u8,
    /// Lists and filters without deleting anything.
    pub dry_run: bool,
    /// What to do when deleting a run fails.
    pub failure_policy: FailurePolicy,
    /// How each request is retried.
    pub retry: RetryPolicy,
    /// Once this turns `true`, no further run is deleted.
    pub stop: Option<watch::Receiver<bool>>,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            dry_run: false,
            failure_policy: FailurePolicy::default(),
            retry: RetryPolicy::default(),
            stop: None,
        }
    }
}

impl PurgeOptions {
    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(|stop| *stop.borrow())
    }
}

/// A run that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDeletion {
    /// The run id.
    pub run_id: u64,
    /// Why deleting failed.
    pub reason: String,
}

/// The outcome of [`purge`].
///
/// Every matched id ends up in exactly one of the other id lists, unless this is a dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Runs listed across all pages.
    pub listed: usize,
    /// Ids of the runs matching the workflow name, in listing order.
    pub matched: Vec<u64>,
    /// Ids of the deleted runs.
    pub deleted: Vec<u64>,
    /// Ids of runs that were already gone when deleting them.
    pub missing: Vec<u64>,
    /// Runs that could not be deleted.
    pub failed: Vec<FailedDeletion>,
    /// Ids of runs never attempted, after a failure with [`FailurePolicy::FailFast`] or a stop request.
    pub skipped: Vec<u64>,
    /// Whether deleting was skipped on purpose.
    pub dry_run: bool,
}

impl PurgeReport {
    /// Whether every attempted deletion went through.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether no matching run is left behind, as far as this purge knows.
    pub fn is_complete(&self) -> bool {
        !self.dry_run && self.failed.is_empty() && self.skipped.is_empty()
    }
}

impl Display for PurgeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dry_run {
            return write!(
                f,
                "listed {}, matched {} (dry run, nothing deleted)",
                self.listed,
                self.matched.len()
            );
        }

        write!(
            f,
            "listed {}, matched {}, deleted {}, missing {}, failed {}, skipped {}",
            self.listed,
            self.matched.len(),
            self.deleted.len(),
            self.missing.len(),
            self.failed.len(),
            self.skipped.len()
        )
    }
}

/// Selects the ids of the runs named exactly `workflow_name`, in order and without duplicates.
pub fn select_run_ids(runs: &[WorkflowRun], workflow_name: &str) -> Vec<u64> {
    let mut seen = HashSet::new();
    runs.iter()
        .filter(|run| run.is_named(workflow_name))
        .map(|run| run.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Deletes every run of the workflow named `workflow_name` in a repository.
///
/// All pages of the run list are fetched before anything is deleted. Runs are then deleted one at a time, in listing order.
/// Failed deletions are collected in the report and handled according to [`PurgeOptions::failure_policy`].
///
/// # Errors
///
/// Returns an error if the runs cannot be listed. Nothing is deleted in that case.
pub async fn purge<A>(
    api: &A,
    repository: &Repository,
    workflow_name: &str,
    options: &PurgeOptions,
) -> StateResult<PurgeReport>
where
    A: ActionsApi + Sync,
{
    info!("purging runs of workflow {workflow_name:?} in {repository}…");

    let runs = fetch_workflow_runs(api, repository, options.per_page, options.retry).await?;
    let matched = select_run_ids(&runs, workflow_name);
    info!(
        "{} of {} runs belong to workflow {workflow_name:?}",
        matched.len(),
        runs.len()
    );

    let mut report = PurgeReport {
        listed: runs.len(),
        matched: matched.clone(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    if options.dry_run {
        for run_id in &matched {
            info!(
                "would run: DELETE {}",
                api.workflow_run_url(repository, *run_id)
            );
        }
        return Ok(report);
    }

    let mut pending = matched.into_iter();
    while let Some(run_id) = pending.next() {
        if options.stop_requested() {
            warn!("stop requested, leaving the remaining runs of {repository} untouched");
            report.skipped.push(run_id);
            report.skipped.extend(pending.by_ref());
            break;
        }

        match delete_workflow_run(api, repository, run_id, options.retry).await {
            Ok(Deletion::Deleted) => report.deleted.push(run_id),
            Ok(Deletion::NotFound) => report.missing.push(run_id),
            Err(err) => {
                error!("failed to delete workflow run {run_id} of {repository}: {err}");
                report.failed.push(FailedDeletion {
                    run_id,
                    reason: err.to_string(),
                });

                if options.failure_policy == FailurePolicy::FailFast {
                    report.skipped.extend(pending.by_ref());
                    warn!(
                        "stopping after the first failure, {} runs skipped",
                        report.skipped.len()
                    );
                    break;
                }
            }
        }
    }

    if report.is_success() {
        info!("purged workflow {workflow_name:?} in {repository}: {report}");
    } else {
        error!("purged workflow {workflow_name:?} in {repository} with failures: {report}");
    }
    Ok(report)
}
