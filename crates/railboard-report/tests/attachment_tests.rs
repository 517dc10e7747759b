//! Download and inline-embedding behavior of the attachment pipeline.

mod common;

use common::MockApi;
use railboard_core::{AttachmentMeta, PipelineConfig};
use railboard_report::attachments;
use serde_json::json;
use std::sync::Arc;

fn meta(id: u64, name: &str, size: u64) -> AttachmentMeta {
    AttachmentMeta {
        id,
        name: name.to_string(),
        result_id: Some(50),
        size,
        content_type: Some("text/plain".to_string()),
    }
}

#[tokio::test]
async fn inline_threshold_is_inclusive() {
    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        inline_threshold: 8,
        ..PipelineConfig::default()
    };
    let api = MockApi::new()
        .with_bytes("get_attachment/1", vec![b'a'; 8])
        .with_bytes("get_attachment/2", vec![b'b'; 9]);

    let jobs = attachments::eligible_jobs(
        3,
        40,
        Some(50),
        vec![meta(1, "at-limit.txt", 8), meta(2, "over-limit.txt", 9)],
        out.path(),
    );
    let processed = attachments::download_all(&api, jobs, &config).await;

    let (_, at_limit) = &processed[0];
    assert!(at_limit.inline_embedded);
    assert!(at_limit
        .inline_data
        .as_deref()
        .unwrap()
        .starts_with("data:text/plain;base64,"));

    let (_, over_limit) = &processed[1];
    assert!(!over_limit.inline_embedded);
    assert!(over_limit.inline_data.is_none());
    assert_eq!(over_limit.path.as_deref(), Some("run_3/40_2_over-limit.txt"));
}

#[tokio::test]
async fn failed_download_is_recorded_as_skipped() {
    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    // No payload registered, so the download errors.
    let api = MockApi::new();

    let jobs = attachments::eligible_jobs(
        3,
        40,
        Some(50),
        vec![meta(7, "gone.txt", 100)],
        out.path(),
    );
    let processed = attachments::download_all(&api, jobs, &config).await;

    let (test_id, attachment) = &processed[0];
    assert_eq!(*test_id, 40);
    assert!(attachment.skipped);
    assert!(attachment.path.is_none());
    // With no downloaded bytes, the declared size stands in for visibility.
    assert_eq!(attachment.size, 100);
}

#[tokio::test]
async fn metadata_failures_degrade_to_no_attachments() {
    let config = PipelineConfig::default();
    // Only test 10 has a metadata endpoint registered.
    let api: Arc<MockApi> = Arc::new(MockApi::new().with_page(
        &format!("get_attachments_for_test/{}", 10),
        config.page_size,
        json!([{"id": 1, "name": "a.txt", "result_id": 50, "size": 3}]),
    ));

    let (by_test, _telemetry) =
        attachments::fetch_metadata(api, vec![10, 11, 12], &config).await.unwrap();
    assert_eq!(by_test.len(), 1);
    assert!(by_test.contains_key(&10));
}
