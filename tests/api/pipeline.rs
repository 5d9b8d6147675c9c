//! tests/api/pipeline.rs
use crate::helpers::{BUCKET, RUN_ID_SEED, spawn_app, test_data_dir};
use mini_mapreduce::counts::WordCounts;
use mini_mapreduce::mappers::count_words;
use mini_mapreduce::reference::ObjectRef;
use mini_mapreduce::run_id::{RunIdGenerator, SeededRunIds};
use mini_mapreduce::storage::ObjectStore;
use mini_mapreduce::verify::verify;

async fn stored_counts(app: &crate::helpers::TestApp, reference: &str) -> WordCounts {
    let reference = ObjectRef::parse(reference).expect("Invalid reference");
    let data = app
        .storage
        .get(reference.bucket(), reference.key())
        .await
        .expect("Missing object");
    WordCounts::from_json(&data).expect("Not a word count mapping")
}

#[tokio::test]
async fn driver_counts_the_cat_on_the_mat() {
    let app = spawn_app().await;
    let source = app.put_source("cat.txt", "the cat sat on the mat").await;

    let report = app
        .driver()
        .await
        .run(&source, 2)
        .await
        .expect("Job failed");

    assert_eq!(report.run_id, SeededRunIds::new(RUN_ID_SEED).generate());
    assert_eq!(report.chunk_refs.len(), 2);
    assert_eq!(report.map_refs.len(), 2);
    for (i, map_ref) in report.map_refs.iter().enumerate() {
        assert_eq!(
            *map_ref,
            format!("s3://{BUCKET}/maps/run-{}/map-{i}.json", report.run_id)
        );
    }
    assert_eq!(
        report.result_ref,
        format!("s3://{BUCKET}/reduce/run-{}/result.json", report.run_id)
    );

    let expected: WordCounts = [("the", 2), ("cat", 1), ("sat", 1), ("on", 1), ("mat", 1)]
        .into_iter()
        .collect();
    assert_eq!(stored_counts(&app, &report.result_ref).await, expected);

    let partials = [
        stored_counts(&app, &report.map_refs[0]).await,
        stored_counts(&app, &report.map_refs[1]).await,
    ];
    assert_eq!(partials[0].total() + partials[1].total(), 6);

    app.application.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn driver_result_agrees_with_a_direct_count_of_a_book() {
    let app = spawn_app().await;
    let mut path = test_data_dir();
    path.push("book.txt");
    let text = std::fs::read_to_string(&path).expect("Failed to read test file");
    let source = app.put_source("book.txt", &text).await;

    let driver = app.driver().await;
    let whole = driver.run(&source, 1).await.expect("Job failed");
    let result = stored_counts(&app, &whole.result_ref).await;
    assert!(verify(&text, &result).is_exact());
    assert_eq!(result, count_words(&text));

    for chunks in [3, 7, 16] {
        let report = driver.run(&source, chunks).await.expect("Job failed");
        assert_eq!(report.chunk_refs.len(), chunks as usize);

        let result = stored_counts(&app, &report.result_ref).await;
        let verification = verify(&text, &result);
        assert!(verification.is_consistent(), "{verification:?}");
        // One word lost per interior boundary at most, and no word in the
        // book holds more than two tokens.
        let lost_bound = 2 * (chunks as u64 - 1);
        assert!(verification.missing.total() <= lost_bound, "{verification:?}");
    }

    app.application.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn each_run_writes_under_its_own_run_id() {
    let app = spawn_app().await;
    let source = app.put_source("cat.txt", "the cat sat on the mat").await;
    let driver = app.driver().await;

    let first = driver.run(&source, 2).await.expect("Job failed");
    let second = driver.run(&source, 3).await.expect("Job failed");

    assert_ne!(first.run_id, second.run_id);
    let keys = app.storage.list(BUCKET).await;
    let first_keys = keys
        .iter()
        .filter(|k| k.contains(&format!("run-{}/", first.run_id)))
        .count();
    let second_keys = keys
        .iter()
        .filter(|k| k.contains(&format!("run-{}/", second.run_id)))
        .count();
    // chunks + maps + result
    assert_eq!(first_keys, 2 + 2 + 1);
    assert_eq!(second_keys, 3 + 3 + 1);

    app.application.shutdown().await.expect("Failed to shut down");
}
