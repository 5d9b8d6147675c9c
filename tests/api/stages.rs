//! tests/api/stages.rs
use crate::helpers::{BUCKET, spawn_app};
use claims::{assert_err, assert_ok};
use mini_mapreduce::error::ErrorKind;
use mini_mapreduce::pipeline::{MapRequest, ReduceRequest, SplitRequest};
use tarpc::context;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let driver = app.driver().await;
    assert!(driver.health().await.expect("Health check failed"));
    app.application.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn split_with_non_positive_chunk_count_makes_three_chunks() {
    let app = spawn_app().await;
    let source = app.put_source("text.txt", "one two three four five six").await;
    let client = app.client().await;

    let response = client
        .split(
            context::current(),
            SplitRequest {
                source_ref: source,
                chunk_count: -1,
            },
        )
        .await
        .expect("Rpc failed");
    let response = assert_ok!(response);
    assert_eq!(response.chunk_refs.len(), 3);

    app.application.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn stage_failures_reach_the_caller_with_their_kind() {
    let app = spawn_app().await;
    let client = app.client().await;

    let failure = assert_err!(
        client
            .reduce(context::current(), ReduceRequest { map_refs: vec![] })
            .await
            .expect("Rpc failed")
    );
    assert_eq!(failure.kind, ErrorKind::InvalidInput);

    let failure = assert_err!(
        client
            .split(
                context::current(),
                SplitRequest {
                    source_ref: "not-a-ref".into(),
                    chunk_count: 2,
                },
            )
            .await
            .expect("Rpc failed")
    );
    assert_eq!(failure.kind, ErrorKind::InvalidInput);

    let failure = assert_err!(
        client
            .map(
                context::current(),
                MapRequest {
                    chunk_ref: format!("s3://{BUCKET}/chunks/run-none/chunk-0.txt"),
                },
            )
            .await
            .expect("Rpc failed")
    );
    assert_eq!(failure.kind, ErrorKind::StoreFailure);

    app.application.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn malformed_map_results_fail_the_reduce() {
    let app = spawn_app().await;
    app.put_source("maps/run-bad/map-0.json", "{\"a\": \"lots\"}").await;
    let client = app.client().await;

    let failure = assert_err!(
        client
            .reduce(
                context::current(),
                ReduceRequest {
                    map_refs: vec![format!("s3://{BUCKET}/maps/run-bad/map-0.json")],
                },
            )
            .await
            .expect("Rpc failed")
    );
    assert_eq!(failure.kind, ErrorKind::MalformedResult);

    app.application.shutdown().await.expect("Failed to shut down");
}
