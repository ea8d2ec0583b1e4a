//! Purges against a mocked GitHub REST API.

use actions_purge::{
    framework::RetryPolicy,
    transactions::{PurgeOptions, purge},
    workflow::{GitHubClient, Repository},
};
use httpmock::prelude::*;
use serde_json::json;

const RUNS: &str = "/repos/fathom-global/fathom-complex-model/actions/runs";

fn repository() -> Repository {
    Repository::new("fathom-global", "fathom-complex-model")
}

fn options(per_page: u8) -> PurgeOptions {
    PurgeOptions {
        per_page,
        retry: RetryPolicy::NEVER,
        ..Default::default()
    }
}

#[tokio::test]
async fn purges_matching_runs_across_pages() {
    let server = MockServer::start_async().await;
    let first_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RUNS)
                .query_param("per_page", "2")
                .query_param("page", "1");
            then.status(200).json_body(json!({
                "total_count": 3,
                "workflow_runs": [
                    { "id": 101, "name": "lint_and_test" },
                    { "id": 102, "name": "code_formatting" }
                ]
            }));
        })
        .await;
    let second_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RUNS)
                .query_param("per_page", "2")
                .query_param("page", "2");
            then.status(200).json_body(json!({
                "total_count": 3,
                "workflow_runs": [{ "id": 103, "name": "lint_and_test" }]
            }));
        })
        .await;
    let delete_101 = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/101"));
            then.status(204);
        })
        .await;
    let delete_102 = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/102"));
            then.status(204);
        })
        .await;
    let delete_103 = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/103"));
            then.status(204);
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "test-token").unwrap();
    let report = purge(&client, &repository(), "lint_and_test", &options(2))
        .await
        .unwrap();

    first_page.assert_hits_async(1).await;
    second_page.assert_hits_async(1).await;
    delete_101.assert_hits_async(1).await;
    delete_102.assert_hits_async(0).await;
    delete_103.assert_hits_async(1).await;

    assert_eq!(report.listed, 3);
    assert_eq!(report.matched, vec![101, 103]);
    assert_eq!(report.deleted, vec![101, 103]);
    assert!(report.is_complete());
}

#[tokio::test]
async fn an_emptied_history_issues_no_deletes() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path(RUNS);
            then.status(200)
                .json_body(json!({ "total_count": 0, "workflow_runs": [] }));
        })
        .await;
    let deletes = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(204);
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "test-token").unwrap();
    let report = purge(&client, &repository(), "lint_and_test", &options(100))
        .await
        .unwrap();

    listing.assert_hits_async(1).await;
    deletes.assert_hits_async(0).await;
    assert_eq!(report.listed, 0);
    assert!(report.matched.is_empty());
}

#[tokio::test]
async fn failed_deletions_are_reported_and_skipped_over() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RUNS);
            then.status(200).json_body(json!({
                "total_count": 3,
                "workflow_runs": [
                    { "id": 1, "name": "lint_and_test" },
                    { "id": 2, "name": "lint_and_test" },
                    { "id": 3, "name": "lint_and_test" }
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/1"));
            then.status(204);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/2"));
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{RUNS}/3"));
            then.status(404);
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "test-token").unwrap();
    let report = purge(&client, &repository(), "lint_and_test", &options(100))
        .await
        .unwrap();

    assert_eq!(report.deleted, vec![1]);
    assert_eq!(report.missing, vec![3]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].run_id, 2);
    assert!(report.failed[0].reason.contains("500"));
}

#[tokio::test]
async fn unauthorized_listing_aborts_the_purge() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RUNS);
            then.status(401)
                .json_body(json!({ "message": "Bad credentials" }));
        })
        .await;
    let deletes = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(204);
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "wrong-token").unwrap();
    let result = purge(&client, &repository(), "lint_and_test", &options(100)).await;

    let err = result.unwrap_err();
    assert!(!err.is_retry());
    assert!(err.to_string().contains("401"));
    deletes.assert_hits_async(0).await;
}
