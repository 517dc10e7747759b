//! Bounded-concurrency retrieval of per-run test and result data.
//!
//! Fetch calls for distinct runs execute in a semaphore-bounded pool;
//! workers return values and never touch shared state. After all tasks
//! join, the surviving slots are re-sorted into the canonical run order, so
//! the output is deterministic regardless of completion order. A run whose
//! fetch fails is logged and excluded; generation continues without it.

use railboard_api::{endpoints, ApiClient, ApiResult, FetchTelemetry};
use railboard_core::{PipelineConfig, Run, Test, TestResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Raw per-run data as returned by one fetch worker.
#[derive(Debug)]
pub struct RunData {
    pub run: Run,
    pub tests: Vec<Test>,
    pub results: Vec<TestResult>,
    pub telemetry: FetchTelemetry,
}

async fn fetch_run_data(
    client: &dyn ApiClient,
    run: &Run,
    page_size: usize,
    telemetry: &mut FetchTelemetry,
) -> ApiResult<(Vec<Test>, Vec<TestResult>)> {
    let tests = endpoints::get_tests(client, run.id, page_size, telemetry).await?;
    let results = endpoints::get_results_for_run(client, run.id, page_size, telemetry).await?;
    debug!(
        "run {}: {} tests, {} results",
        run.id,
        tests.len(),
        results.len()
    );
    Ok((tests, results))
}

/// Fetch every resolved run's data through the bounded worker pool.
///
/// The returned list preserves the canonical order of `runs`; failed runs
/// are simply absent from it.
pub async fn fetch_runs(
    client: Arc<dyn ApiClient>,
    runs: Vec<Run>,
    config: &PipelineConfig,
) -> anyhow::Result<Vec<RunData>> {
    let pool = config.run_pool_size(runs.len());
    info!("fetching {} runs with {} workers", runs.len(), pool);

    let semaphore = Arc::new(Semaphore::new(pool));
    let mut handles = Vec::with_capacity(runs.len());
    for (index, run) in runs.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let client = client.clone();
        let page_size = config.page_size;
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let mut telemetry = FetchTelemetry::new();
            let fetched = fetch_run_data(client.as_ref(), &run, page_size, &mut telemetry).await;
            (index, run, fetched, telemetry)
        }));
    }

    let mut slots = Vec::with_capacity(handles.len());
    for handle in handles {
        let (index, run, fetched, telemetry) = handle.await?;
        match fetched {
            Ok((tests, results)) => slots.push((
                index,
                RunData {
                    run,
                    tests,
                    results,
                    telemetry,
                },
            )),
            Err(e) => warn!("run {} fetch failed: {e}; excluding it from the report", run.id),
        }
    }

    // Completion order is arbitrary; canonical order is not.
    slots.sort_by_key(|(index, _)| *index);
    Ok(slots.into_iter().map(|(_, data)| data).collect())
}
