//! Data models of GitHub Actions workflow runs and the API to manage them.

#![cfg(feature = "workflow")]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub mod client;

pub use client::{ActionsApi, Deletion, GitHubClient};

/// A repository on GitHub, addressed by its owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// The user or organization owning the repository.
    pub owner: String,
    /// The repository name.
    pub name: String,
}

impl Repository {
    /// Creates a [`Repository`]. Neither part is validated.
    pub fn new<O, N>(owner: O, name: N) -> Self
    where
        O: Into<String>,
        N: Into<String>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A page of workflow runs from GitHub REST API.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WorkflowRuns {
    /// The number of runs across all pages.
    pub total_count: u64,
    /// The runs on this page.
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Represents a GitHub Actions workflow run from GitHub REST API.
///
/// Only [`WorkflowRun::id`] and [`WorkflowRun::name`] drive a purge, the rest is informational.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// The run id, used verbatim to address the run.
    pub id: u64,
    /// The workflow name. GitHub may omit it.
    pub name: Option<String>,
    /// The run number within its workflow.
    pub run_number: Option<u64>,
    /// `queued`, `in_progress`, `completed`...
    pub status: Option<String>,
    /// `success`, `failure`, `cancelled`...
    pub conclusion: Option<String>,
    /// The branch the run was triggered on.
    pub head_branch: Option<String>,
    /// When the run was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Whether this run belongs to the workflow with exactly this name.
    pub fn is_named(&self, workflow_name: &str) -> bool {
        self.name.as_deref() == Some(workflow_name)
    }
}

impl Display for WorkflowRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        if let Some(run_number) = self.run_number {
            write!(f, " #{run_number}")?;
        }
        write!(f, " ({}", self.id)?;
        if let Some(created_at) = self.created_at {
            write!(f, ", created {}", created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        write!(f, ")")
    }
}
