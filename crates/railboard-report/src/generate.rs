//! Top-level orchestration of a report generation.
//!
//! All cross-run aggregation happens here, on the orchestrating task, after
//! the concurrent stages have joined; workers only ever return values. The
//! user-identity cache is likewise only mutated from this task.

use crate::render::ReportRenderer;
use crate::{assembler, attachments, fetcher, resolve};
use anyhow::Context as _;
use chrono::Utc;
use railboard_api::{endpoints, ApiClient, FetchTelemetry, UserLookup};
use railboard_core::{
    default_priority_labels, default_status_labels, table, PipelineConfig, ProcessedAttachment,
    ReportError,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Caller's selection and tuning for one generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub project_id: u64,
    pub run_id: Option<u64>,
    pub plan_id: Option<u64>,
    pub run_subset: Option<Vec<u64>>,
    pub output_dir: PathBuf,
    pub config: PipelineConfig,
}

/// Generate a report and write it (plus its attachment tree) under the
/// output directory. Returns the path of the rendered document.
pub async fn generate_report(
    client: Arc<dyn ApiClient>,
    renderer: &dyn ReportRenderer,
    options: GenerateOptions,
) -> anyhow::Result<PathBuf> {
    let target = resolve::validate_target(
        options.run_id,
        options.plan_id,
        options.run_subset.clone(),
    )?;
    let resolved = resolve::resolve_runs(client.as_ref(), &target).await?;
    if resolved.runs.is_empty() {
        return Err(ReportError::NoRunsResolved.into());
    }

    let run_data = fetcher::fetch_runs(client.clone(), resolved.runs, &options.config).await?;
    if run_data.is_empty() {
        // Every run's fetch failed; there is nothing left to report on.
        return Err(ReportError::NoRunsResolved.into());
    }

    let status_labels = match endpoints::get_statuses(client.as_ref()).await {
        Ok(labels) if !labels.is_empty() => labels,
        Ok(_) => default_status_labels(),
        Err(e) => {
            warn!("status lookup failed: {e}; using built-in labels");
            default_status_labels()
        }
    };
    let priority_labels = match endpoints::get_priorities(client.as_ref()).await {
        Ok(labels) if !labels.is_empty() => labels,
        Ok(_) => default_priority_labels(),
        Err(e) => {
            warn!("priority lookup failed: {e}; using built-in labels");
            default_priority_labels()
        }
    };

    let mut users = UserLookup::new();
    let mut telemetry = FetchTelemetry::new();
    let mut summaries = Vec::with_capacity(run_data.len());

    for data in run_data {
        let fetcher::RunData {
            run,
            tests,
            results,
            telemetry: run_telemetry,
        } = data;
        telemetry.merge(run_telemetry);

        let latest = table::latest_results(results);

        let mut assignee_ids: HashSet<u64> = HashSet::new();
        for test in &tests {
            assignee_ids.extend(test.assignedto_id);
        }
        for result in latest.values() {
            assignee_ids.extend(result.assignedto_id);
        }
        let mut assignee_names = HashMap::with_capacity(assignee_ids.len());
        for id in assignee_ids {
            let name = users.resolve(client.as_ref(), id).await;
            assignee_names.insert(id, name);
        }

        let mut rows = table::build_rows(
            &tests,
            &latest,
            &status_labels,
            &priority_labels,
            &assignee_names,
        );

        let test_ids: Vec<u64> = rows.iter().map(|row| row.test_id).collect();
        let (mut metas_by_test, meta_telemetry) =
            attachments::fetch_metadata(client.clone(), test_ids, &options.config).await?;
        telemetry.merge(meta_telemetry);

        let mut jobs = Vec::new();
        for row in &rows {
            let Some(metas) = metas_by_test.remove(&row.test_id) else {
                continue;
            };
            let latest_result_id = latest.get(&row.test_id).map(|result| result.id);
            jobs.extend(attachments::eligible_jobs(
                run.id,
                row.test_id,
                latest_result_id,
                metas,
                &options.output_dir,
            ));
        }

        let processed = attachments::download_all(client.as_ref(), jobs, &options.config).await;
        let mut by_test: HashMap<u64, Vec<ProcessedAttachment>> = HashMap::new();
        for (test_id, attachment) in processed {
            by_test.entry(test_id).or_default().push(attachment);
        }
        for row in &mut rows {
            if let Some(mut row_attachments) = by_test.remove(&row.test_id) {
                row_attachments
                    .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));
                row.attachments = row_attachments;
            }
        }

        summaries.push(table::summarize_run(&run, rows));
    }

    let project_name = match endpoints::get_project(client.as_ref(), options.project_id).await {
        Ok(project) => project.name,
        Err(e) => {
            warn!("project lookup failed: {e}; filename falls back to a generic slug");
            String::new()
        }
    };

    info!(
        "{} api calls, {:?} cumulative call time",
        telemetry.call_count(),
        telemetry.total_elapsed()
    );

    let context = assembler::build_context(
        resolved.plan_name.as_deref(),
        &project_name,
        summaries,
        Utc::now(),
    );

    let document = renderer.render(&context)?;
    tokio::fs::create_dir_all(&options.output_dir).await?;
    let out_path = options.output_dir.join(format!("{}.html", context.file_name));
    tokio::fs::write(&out_path, document)
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!("report written to {}", out_path.display());
    Ok(out_path)
}
