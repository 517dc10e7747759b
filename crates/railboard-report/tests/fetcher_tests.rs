//! Fetch-stage ordering and partial-failure tests.

mod common;

use common::MockApi;
use railboard_core::{PipelineConfig, Run};
use railboard_report::fetcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn run(id: u64) -> Run {
    Run {
        id,
        name: format!("Run {id}"),
    }
}

fn mock_for_runs(ids: &[u64], page_size: usize) -> MockApi {
    let mut api = MockApi::new();
    for id in ids {
        api = api
            .with_page(
                &format!("get_tests/{id}"),
                page_size,
                json!([{"id": id * 10, "title": format!("Case {id}"), "status_id": 1}]),
            )
            .with_page(&format!("get_results_for_run/{id}"), page_size, json!([]));
    }
    api
}

fn config() -> PipelineConfig {
    PipelineConfig {
        run_workers: 4,
        run_worker_ceiling: 4,
        page_size: 250,
        ..PipelineConfig::default()
    }
}

/// Canonical order survives regardless of which run finishes first.
#[tokio::test]
async fn completion_order_does_not_affect_output_order() {
    let config = config();
    let runs = vec![run(1), run(2), run(3)];

    // Forward: run 1 slowest. Reverse: run 3 slowest.
    let forward = Arc::new(
        mock_for_runs(&[1, 2, 3], config.page_size)
            .with_delay("get_tests/1", Duration::from_millis(60))
            .with_delay("get_tests/2", Duration::from_millis(30)),
    );
    let reverse = Arc::new(
        mock_for_runs(&[1, 2, 3], config.page_size)
            .with_delay("get_tests/3", Duration::from_millis(60))
            .with_delay("get_tests/2", Duration::from_millis(30)),
    );

    let forward_data = fetcher::fetch_runs(forward, runs.clone(), &config)
        .await
        .unwrap();
    let reverse_data = fetcher::fetch_runs(reverse, runs, &config).await.unwrap();

    let forward_ids: Vec<u64> = forward_data.iter().map(|d| d.run.id).collect();
    let reverse_ids: Vec<u64> = reverse_data.iter().map(|d| d.run.id).collect();
    assert_eq!(forward_ids, vec![1, 2, 3]);
    assert_eq!(forward_ids, reverse_ids);
}

/// A run whose fetch fails is excluded; the rest keep their order.
#[tokio::test]
async fn failed_run_is_excluded_not_fatal() {
    let config = config();
    // No mocks registered for run 2, so its fetch errors out.
    let api = Arc::new(mock_for_runs(&[1, 3], config.page_size));
    let data = fetcher::fetch_runs(api, vec![run(1), run(2), run(3)], &config)
        .await
        .unwrap();

    let ids: Vec<u64> = data.iter().map(|d| d.run.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

/// Worker telemetry comes back with each run's data.
#[tokio::test]
async fn telemetry_is_returned_alongside_results() {
    let config = config();
    let api = Arc::new(mock_for_runs(&[1], config.page_size));
    let data = fetcher::fetch_runs(api, vec![run(1)], &config).await.unwrap();

    // One tests call plus one results call.
    assert_eq!(data[0].telemetry.call_count(), 2);
}
