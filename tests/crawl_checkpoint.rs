//! End-to-end crawl tests: batching, checkpointing, and resume behavior

mod common;

use catalog_dl::{CatalogDownloader, ProductId, ProductRecord, checkpoint};
use common::{crawl_config, mount_product, mount_status, mount_throttled_then_product};
use wiremock::MockServer;

fn ids(raw: &[&str]) -> Vec<ProductId> {
    raw.iter().map(|id| ProductId::from(*id)).collect()
}

#[tokio::test]
async fn mixed_outcomes_land_in_artifact_and_failure_log() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // A succeeds, B does not exist, C is throttled once then succeeds
    mount_product(&server, "1001", 1001, 1).await;
    mount_status(&server, "1002", 404, 1).await;
    mount_throttled_then_product(&server, "1003", 1003, 1).await;

    let downloader = CatalogDownloader::new(crawl_config(&server.uri(), dir.path())).unwrap();
    let summary = downloader
        .run(&ids(&["1001", "1002", "1003"]))
        .await
        .unwrap();

    assert_eq!(summary.batches_run, 1);
    assert_eq!(summary.successes, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.failures_on_disk, 1);
    assert_eq!(summary.rate_limit_hits, 1, "C was throttled exactly once");

    // Artifact holds A and C (order within a batch is not guaranteed)
    let records = checkpoint::read_artifact(&dir.path().join("batches"), 1).unwrap();
    let mut record_ids: Vec<i64> = records.iter().filter_map(|r| r.id).collect();
    record_ids.sort_unstable();
    assert_eq!(record_ids, vec![1001, 1003]);

    // Failure log holds exactly the 404
    let log = std::fs::read_to_string(dir.path().join("failed_ids.csv")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines, vec!["id,error", "1002,not_found"]);
}

#[tokio::test]
async fn batches_persist_in_strictly_increasing_order() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    for id in 1..=5 {
        mount_product(&server, &id.to_string(), id, 1).await;
    }

    let mut config = crawl_config(&server.uri(), dir.path());
    config.batch.batch_size = 2;
    let downloader = CatalogDownloader::new(config).unwrap();

    let summary = downloader
        .run(&ids(&["1", "2", "3", "4", "5"]))
        .await
        .unwrap();

    assert_eq!(summary.batches_run, 3);
    assert_eq!(summary.successes, 5);

    // Batch membership is positional: [1,2], [3,4], [5]
    let batches_dir = dir.path().join("batches");
    let expected: [&[i64]; 3] = [&[1, 2], &[3, 4], &[5]];
    for (index, expected_ids) in expected.iter().enumerate() {
        let records = checkpoint::read_artifact(&batches_dir, index + 1).unwrap();
        let mut record_ids: Vec<i64> = records.iter().filter_map(|r| r.id).collect();
        record_ids.sort_unstable();
        assert_eq!(record_ids.as_slice(), *expected_ids, "batch {}", index + 1);
    }
}

#[tokio::test]
async fn resume_starts_exactly_after_highest_completed_batch() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let batches_dir = dir.path().join("batches");

    // Batches 1 and 2 already completed in a previous run
    let placeholder = ProductRecord {
        id: Some(999),
        name: None,
        url_key: None,
        price: None,
        description: String::new(),
        image_url: None,
    };
    checkpoint::write_artifact(&batches_dir, 1, &[placeholder.clone()]).unwrap();
    checkpoint::write_artifact(&batches_dir, 2, &[placeholder.clone()]).unwrap();

    // Identifiers of completed batches must not be fetched again
    for id in 1..=4 {
        mount_status(&server, &id.to_string(), 200, 0).await;
    }
    mount_product(&server, "5", 5, 1).await;
    mount_product(&server, "6", 6, 1).await;

    let mut config = crawl_config(&server.uri(), dir.path());
    config.batch.batch_size = 2;
    let downloader = CatalogDownloader::new(config).unwrap();

    let summary = downloader
        .run(&ids(&["1", "2", "3", "4", "5", "6"]))
        .await
        .unwrap();

    assert_eq!(summary.batches_run, 1, "only batch 3 remained");
    assert_eq!(summary.successes, 2);

    // The resumed run must not touch the completed artifacts
    let untouched = checkpoint::read_artifact(&batches_dir, 1).unwrap();
    assert_eq!(untouched, vec![placeholder]);

    let batch3 = checkpoint::read_artifact(&batches_dir, 3).unwrap();
    let mut record_ids: Vec<i64> = batch3.iter().filter_map(|r| r.id).collect();
    record_ids.sort_unstable();
    assert_eq!(record_ids, vec![5, 6]);
}

#[tokio::test]
async fn fully_completed_input_runs_no_batches() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let batches_dir = dir.path().join("batches");

    checkpoint::write_artifact(&batches_dir, 1, &[]).unwrap();
    mount_status(&server, "1", 200, 0).await;
    mount_status(&server, "2", 200, 0).await;

    let mut config = crawl_config(&server.uri(), dir.path());
    config.batch.batch_size = 2;
    let downloader = CatalogDownloader::new(config).unwrap();

    let summary = downloader.run(&ids(&["1", "2"])).await.unwrap();
    assert_eq!(summary.batches_run, 0);
    assert_eq!(summary.successes, 0);
}

#[tokio::test]
async fn failed_artifact_write_leaves_no_checkpoint_and_batch_is_redone() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let batches_dir = dir.path().join("batches");

    // Every identifier is fetched twice: once by the failing run, once by the
    // retry after the blocker is removed
    mount_product(&server, "1", 1, 2).await;
    mount_product(&server, "2", 2, 2).await;

    // A directory squatting on the temp-file name makes the artifact write
    // fail after the batch has fully joined
    std::fs::create_dir_all(batches_dir.join("batch_1.json.tmp")).unwrap();

    let downloader = CatalogDownloader::new(crawl_config(&server.uri(), dir.path())).unwrap();
    let identifiers = ids(&["1", "2"]);

    let err = downloader.run(&identifiers).await.unwrap_err();
    assert!(matches!(err, catalog_dl::Error::Io(_)));
    assert!(
        !batches_dir.join("batch_1.json").exists(),
        "a failed write must not leave an artifact"
    );

    // Restart after clearing the blocker: the whole batch is reprocessed
    std::fs::remove_dir_all(batches_dir.join("batch_1.json.tmp")).unwrap();
    let summary = downloader.run(&identifiers).await.unwrap();

    assert_eq!(summary.batches_run, 1);
    assert_eq!(summary.successes, 2);
    assert!(batches_dir.join("batch_1.json").exists());
}

#[tokio::test]
async fn run_from_csv_crawls_the_listed_identifiers() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_product(&server, "11", 11, 1).await;
    mount_product(&server, "22", 22, 1).await;

    let csv_path = dir.path().join("ids.csv");
    std::fs::write(&csv_path, "id\n11\n22\n").unwrap();

    let downloader = CatalogDownloader::new(crawl_config(&server.uri(), dir.path())).unwrap();
    let summary = downloader.run_from_csv(&csv_path).await.unwrap();

    assert_eq!(summary.successes, 2);
    let records = checkpoint::read_artifact(&dir.path().join("batches"), 1).unwrap();
    assert_eq!(records.len(), 2);
}
