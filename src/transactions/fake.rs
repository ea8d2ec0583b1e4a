//! An in-memory [`ActionsApi`] recording every call.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    framework::{StateError, StateResult},
    workflow::{ActionsApi, Deletion, Repository, WorkflowRun, WorkflowRuns},
};

pub fn run(id: u64, name: &str) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some(String::from(name)),
        run_number: None,
        status: Some(String::from("completed")),
        conclusion: Some(String::from("success")),
        head_branch: Some(String::from("main")),
        created_at: None,
    }
}

#[derive(Debug, Default)]
pub struct FakeActions {
    pub runs: Mutex<Vec<WorkflowRun>>,
    pub listed_pages: Mutex<Vec<u32>>,
    pub delete_calls: Mutex<Vec<u64>>,
    /// Deleting these fails for good.
    pub rejected: HashSet<u64>,
    /// Deleting these fails with a retryable error this many times first.
    pub flaky: Mutex<HashMap<u64, u8>>,
    /// Listed, but already gone when deleting them.
    pub vanished: HashSet<u64>,
    /// Listing this page fails for good.
    pub broken_page: Option<u32>,
    /// Requests a stop once a run is deleted.
    pub stop_on_delete: Option<watch::Sender<bool>>,
}

impl FakeActions {
    pub fn with_runs<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = WorkflowRun>,
    {
        Self {
            runs: Mutex::new(runs.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn remaining_ids(&self) -> Vec<u64> {
        self.runs.lock().iter().map(|run| run.id).collect()
    }

    pub fn delete_calls(&self) -> Vec<u64> {
        self.delete_calls.lock().clone()
    }

    pub fn listed_pages(&self) -> Vec<u32> {
        self.listed_pages.lock().clone()
    }
}

impl ActionsApi for FakeActions {
    async fn list_workflow_runs(
        &self,
        _repository: &Repository,
        page: u32,
        per_page: u8,
    ) -> StateResult<WorkflowRuns> {
        self.listed_pages.lock().push(page);
        if self.broken_page == Some(page) {
            return Err(StateError::Cancelled(anyhow!("404 Not Found")));
        }

        let runs = self.runs.lock();
        let start = (page as usize - 1) * usize::from(per_page);
        Ok(WorkflowRuns {
            total_count: runs.len() as u64,
            workflow_runs: runs
                .iter()
                .skip(start)
                .take(usize::from(per_page))
                .cloned()
                .collect(),
        })
    }

    async fn delete_workflow_run(
        &self,
        _repository: &Repository,
        run_id: u64,
    ) -> StateResult<Deletion> {
        self.delete_calls.lock().push(run_id);
        if self.rejected.contains(&run_id) {
            return Err(StateError::Cancelled(anyhow!("403 Forbidden")));
        }
        if self.vanished.contains(&run_id) {
            return Ok(Deletion::NotFound);
        }
        {
            let mut flaky = self.flaky.lock();
            if let Some(failures) = flaky.get_mut(&run_id).filter(|failures| **failures > 0) {
                *failures -= 1;
                return Err(StateError::Retry(anyhow!("502 Bad Gateway")));
            }
        }

        let mut runs = self.runs.lock();
        match runs.iter().position(|run| run.id == run_id) {
            Some(index) => {
                runs.remove(index);
                if let Some(stop) = &self.stop_on_delete {
                    stop.send_replace(true);
                }
                Ok(Deletion::Deleted)
            }
            None => Ok(Deletion::NotFound),
        }
    }

    fn workflow_run_url(&self, repository: &Repository, run_id: u64) -> String {
        format!("fake://repos/{repository}/actions/runs/{run_id}")
    }
}
