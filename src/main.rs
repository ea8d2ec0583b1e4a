//! Command line entry point: purges the runs of one workflow and prints a summary.

use std::{process::ExitCode, time::Duration};

use actions_purge::{
    env::{GITHUB_API_URL, GITHUB_TOKEN, MAX_RETRIES, RETRY_DELAY_MS},
    framework::RetryPolicy,
    shutdown,
    transactions::{FailurePolicy, MAX_PER_PAGE, PurgeOptions, purge},
    workflow::{GitHubClient, Repository},
};
use anyhow::Context as _;
use clap::Parser as _;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Deletes every recorded run of a GitHub Actions workflow.
///
/// Authenticates with the token in `GITHUB_TOKEN`.
#[derive(Debug, clap::Parser)]
#[command(version)]
struct Args {
    /// The user or organization owning the repository
    #[arg(long, env = "OWNER")]
    owner: String,

    /// The repository name
    #[arg(long, env = "REPOSITORY")]
    repository: String,

    /// The workflow name, matched exactly
    #[arg(long, env = "WORKFLOW")]
    workflow: String,

    /// The GitHub REST API root
    #[arg(long, default_value_t = GITHUB_API_URL.clone())]
    api_url: String,

    /// Runs per listing page
    #[arg(long, default_value_t = MAX_PER_PAGE, value_parser = clap::value_parser!(u8).range(1..=100))]
    per_page: u8,

    /// Retries per request on network errors, rate limits and server errors
    #[arg(long, default_value_t = *MAX_RETRIES)]
    max_retries: u8,

    /// Delay before the first retry, growing linearly with each attempt
    #[arg(long, default_value_t = *RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// List the runs that would be deleted without deleting them
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first failed deletion instead of moving on
    #[arg(long)]
    fail_fast: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("actions_purge=warn,purge_workflow_runs=warn")
        } else {
            EnvFilter::new("actions_purge=info,purge_workflow_runs=info")
        }
    });
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the tracing subscriber")?;

    let token = GITHUB_TOKEN
        .as_deref()
        .context("GITHUB_TOKEN not set in environment")?;
    let client = GitHubClient::new(&args.api_url, token)?;
    let repository = Repository::new(args.owner, args.repository);

    tokio::spawn(shutdown::signal());

    let options = PurgeOptions {
        per_page: args.per_page,
        dry_run: args.dry_run,
        failure_policy: if args.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        },
        retry: RetryPolicy {
            max_retries: args.max_retries,
            delay: Duration::from_millis(args.retry_delay_ms),
        },
        stop: Some(shutdown::subscribe()),
    };

    let report = purge(&client, &repository, &args.workflow, &options)
        .await
        .with_context(|| format!("failed to list the workflow runs of {repository}"))?;

    println!("{repository} / {}: {report}", args.workflow);
    for failed in &report.failed {
        println!("  run {} not deleted: {}", failed.run_id, failed.reason);
    }
    if report.dry_run {
        for run_id in &report.matched {
            println!("  would delete run {run_id}");
        }
    }

    Ok(if report.is_success() && report.skipped.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
