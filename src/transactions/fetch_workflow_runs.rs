use futures::{Stream, TryStreamExt as _, stream};
use tracing::{debug, info};

use crate::{
    framework::{RetryPolicy, StateError, StateResult, run_with_retry},
    workflow::{ActionsApi, Repository, WorkflowRun},
};

/// The largest page GitHub serves.
pub const MAX_PER_PAGE: u8 = 100;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: u32,
    seen: u64,
    exhausted: bool,
}

/// Streams the pages of workflow runs of a repository, starting from page 1.
///
/// The stream ends after an empty page, a page shorter than `per_page`, or once `total_count` runs were seen.
/// Each page is retried according to `policy`. `per_page` is clamped into `1..=100`.
pub fn workflow_run_pages<'a, A>(
    api: &'a A,
    repository: &'a Repository,
    per_page: u8,
    policy: RetryPolicy,
) -> impl Stream<Item = StateResult<Vec<WorkflowRun>>> + 'a
where
    A: ActionsApi + Sync,
{
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let cursor = Cursor {
        page: 1,
        seen: 0,
        exhausted: false,
    };

    stream::try_unfold(cursor, move |cursor| async move {
        if cursor.exhausted {
            return Ok::<_, StateError>(None);
        }

        let name = format!("list page {} of {repository}", cursor.page);
        let runs = run_with_retry(&name, policy, || {
            api.list_workflow_runs(repository, cursor.page, per_page)
        })
        .await?;

        let fetched = runs.workflow_runs.len();
        if fetched == 0 {
            return Ok(None);
        }

        let seen = cursor.seen + fetched as u64;
        let next = Cursor {
            page: cursor.page + 1,
            seen,
            exhausted: fetched < usize::from(per_page) || seen >= runs.total_count,
        };
        Ok(Some((runs.workflow_runs, next)))
    })
}

/// Fetches every workflow run of a repository, combining all pages in listing order.
///
/// # Errors
///
/// Returns the error of the first page that could not be fetched. Nothing is returned for the pages before it.
pub async fn fetch_workflow_runs<A>(
    api: &A,
    repository: &Repository,
    per_page: u8,
    policy: RetryPolicy,
) -> StateResult<Vec<WorkflowRun>>
where
    A: ActionsApi + Sync,
{
    debug!("fetching workflow runs of {repository}…");
    let runs: Vec<WorkflowRun> = workflow_run_pages(api, repository, per_page, policy)
        .try_concat()
        .await?;

    match runs.len() {
        1 => info!("fetched 1 workflow run of {repository}"),
        count => info!("fetched {count} workflow runs of {repository}"),
    }
    Ok(runs)
}
