use tracing::info;

use crate::{
    framework::{RetryPolicy, StateResult, run_with_retry},
    workflow::{ActionsApi, Deletion, Repository},
};

/// Deletes a workflow run, echoing the request before it is sent.
///
/// # Errors
///
/// Returns an error if the request is cancelled or keeps failing after retrying according to `policy`.
pub async fn delete_workflow_run<A>(
    api: &A,
    repository: &Repository,
    run_id: u64,
    policy: RetryPolicy,
) -> StateResult<Deletion>
where
    A: ActionsApi + Sync,
{
    info!("DELETE {}", api.workflow_run_url(repository, run_id));

    let name = format!("delete run {run_id} of {repository}");
    run_with_retry(&name, policy, || api.delete_workflow_run(repository, run_id)).await
}
