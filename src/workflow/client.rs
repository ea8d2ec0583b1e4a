//! Workflow runs through GitHub REST API.

use std::error::Error as _;

use anyhow::{Context as _, anyhow, bail};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url, header};
use tracing::{debug, error, info, warn};

use crate::{
    framework::{StateError, StateResult},
    workflow::{Repository, WorkflowRuns},
};

/// The outcome of a delete request.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The run was deleted.
    Deleted,
    /// The run does not exist (anymore).
    NotFound,
}

/// The operations a purge needs from a code-hosting service.
pub trait ActionsApi {
    /// Lists one page of the workflow runs of a repository. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns an error that instructs retrying or cancelling if the page cannot be fetched or parsed.
    fn list_workflow_runs(
        &self,
        repository: &Repository,
        page: u32,
        per_page: u8,
    ) -> impl Future<Output = StateResult<WorkflowRuns>> + Send;

    /// Deletes a workflow run.
    ///
    /// # Errors
    ///
    /// Returns an error that instructs retrying or cancelling if the run exists but cannot be deleted.
    fn delete_workflow_run(
        &self,
        repository: &Repository,
        run_id: u64,
    ) -> impl Future<Output = StateResult<Deletion>> + Send;

    /// The URL addressing a workflow run, as used by [`ActionsApi::delete_workflow_run`].
    fn workflow_run_url(&self, repository: &Repository, run_id: u64) -> String;
}

/// A GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
}

impl GitHubClient {
    /// Creates a client for the API rooted at `api_url`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not a base URL, or the HTTP client fails to build.
    pub fn new<T>(api_url: &str, token: T) -> anyhow::Result<Self>
    where
        T: Into<String>,
    {
        let api_url =
            Url::parse(api_url).with_context(|| format!("invalid GitHub API URL {api_url:?}"))?;
        if api_url.cannot_be_a_base() {
            bail!("invalid GitHub API URL {api_url}: not a base URL");
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("actions-purge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build the HTTP client")?;

        Ok(Self {
            http,
            api_url,
            token: token.into(),
        })
    }

    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.api_url.clone();
        // Checked by `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn runs_url(&self, repository: &Repository) -> Url {
        self.endpoint([
            "repos",
            repository.owner.as_str(),
            repository.name.as_str(),
            "actions",
            "runs",
        ])
    }

    fn run_url(&self, repository: &Repository, run_id: u64) -> Url {
        let run_id = run_id.to_string();
        self.endpoint([
            "repos",
            repository.owner.as_str(),
            repository.name.as_str(),
            "actions",
            "runs",
            run_id.as_str(),
        ])
    }

    /// Builds a request for GitHub REST API.
    fn request_builder(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

impl ActionsApi for GitHubClient {
    async fn list_workflow_runs(
        &self,
        repository: &Repository,
        page: u32,
        per_page: u8,
    ) -> StateResult<WorkflowRuns> {
        let url = self.runs_url(repository);
        debug!("fetching page {page} of workflow runs from {url}…");

        let response = self
            .request_builder(Method::GET, url.clone())
            .query(&[("per_page", u32::from(per_page)), ("page", page)])
            .send()
            .await
            .map_err(|err| transport_error(err, &url))?;
        let response = check_status(response, &url)?;

        match response.json::<WorkflowRuns>().await {
            Ok(runs) => {
                debug!(
                    "fetched {} workflow runs on page {page} of {repository} ({} in total)",
                    runs.workflow_runs.len(),
                    runs.total_count
                );
                Ok(runs)
            }
            Err(err) => {
                error!("failed to parse data from {url}: {err}");

                if let Some(source) = err.source() {
                    error!("{source}")
                }

                Err(StateError::Retry(
                    anyhow!(err).context(format!("failed to parse data from {url}")),
                ))
            }
        }
    }

    async fn delete_workflow_run(
        &self,
        repository: &Repository,
        run_id: u64,
    ) -> StateResult<Deletion> {
        let url = self.run_url(repository, run_id);

        let response = self
            .request_builder(Method::DELETE, url.clone())
            .send()
            .await
            .map_err(|err| transport_error(err, &url))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("workflow run {run_id} not found at {url}, already deleted?");
            return Ok(Deletion::NotFound);
        }

        check_status(response, &url)?;
        info!("deleted workflow run {run_id} of {repository}");
        Ok(Deletion::Deleted)
    }

    fn workflow_run_url(&self, repository: &Repository, run_id: u64) -> String {
        self.run_url(repository, run_id).to_string()
    }
}

fn transport_error(err: reqwest::Error, url: &Url) -> StateError {
    error!("failed to request {url}: {err}");
    let retry = err.is_connect() || err.is_timeout() || err.is_request();
    let err = anyhow!(err).context(format!("failed to request {url}"));
    if retry {
        StateError::Retry(err)
    } else {
        StateError::Cancelled(err)
    }
}

/// Passes successful responses through.
///
/// Rate limits and server errors are worth retrying, anything else is not.
fn check_status(response: Response, url: &Url) -> StateResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|remaining| remaining == "0"));

    let message = match status.canonical_reason() {
        Some(reason) => format!("{url} responded {} {reason}", status.as_u16()),
        None => format!("{url} responded {}", status.as_u16()),
    };
    error!("{message}");

    if rate_limited || status.is_server_error() {
        Err(StateError::Retry(anyhow!(message)))
    } else {
        Err(StateError::Cancelled(anyhow!(message)))
    }
}
