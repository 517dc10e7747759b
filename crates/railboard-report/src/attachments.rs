//! The attachment pipeline: metadata fetch, eligibility, download,
//! finalization.
//!
//! Metadata is fetched per test in its own (smaller) bounded pool.
//! Downloads then run sequentially within a run to cap simultaneous
//! large-payload memory and disk pressure; each payload streams to a
//! temporary file before finalization. Attachment trouble is never fatal:
//! failures degrade to skipped or absent attachments in the report.

use crate::media;
use railboard_api::{endpoints, ApiClient, FetchTelemetry};
use railboard_core::{AttachmentMeta, DownloadJob, PipelineConfig, ProcessedAttachment};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Fetch attachment metadata for every test id through the bounded pool.
///
/// A test whose metadata fetch fails is logged and treated as having no
/// attachments.
pub async fn fetch_metadata(
    client: Arc<dyn ApiClient>,
    test_ids: Vec<u64>,
    config: &PipelineConfig,
) -> anyhow::Result<(HashMap<u64, Vec<AttachmentMeta>>, FetchTelemetry)> {
    let pool = config.attachment_pool_size(test_ids.len());
    let semaphore = Arc::new(Semaphore::new(pool));
    let mut handles = Vec::with_capacity(test_ids.len());
    for test_id in test_ids {
        let permit = semaphore.clone().acquire_owned().await?;
        let client = client.clone();
        let page_size = config.page_size;
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let mut telemetry = FetchTelemetry::new();
            let metas = endpoints::get_attachments_for_test(
                client.as_ref(),
                test_id,
                page_size,
                &mut telemetry,
            )
            .await;
            (test_id, metas, telemetry)
        }));
    }

    let mut by_test = HashMap::new();
    let mut telemetry = FetchTelemetry::new();
    for handle in handles {
        let (test_id, metas, worker_telemetry) = handle.await?;
        telemetry.merge(worker_telemetry);
        match metas {
            Ok(metas) => {
                if !metas.is_empty() {
                    by_test.insert(test_id, metas);
                }
            }
            Err(e) => warn!(
                "attachment metadata fetch for test {test_id} failed: {e}; treating as none"
            ),
        }
    }
    Ok((by_test, telemetry))
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.trim_matches('_').is_empty() {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

fn derive_filename(meta: &AttachmentMeta) -> String {
    let mut name = sanitize_filename(&meta.name);
    if !name.contains('.') {
        if let Some(ext) = meta.content_type.as_deref().and_then(media::extension_for) {
            name.push('.');
            name.push_str(ext);
        }
    }
    name
}

/// Turn a test's eligible attachment metadata into download jobs.
///
/// Only attachments belonging to the test's latest result survive; entries
/// from superseded attempts are discarded. Destinations are namespaced by
/// run and keyed by test id + attachment id so concurrent runs never
/// collide.
pub fn eligible_jobs(
    run_id: u64,
    test_id: u64,
    latest_result_id: Option<u64>,
    metas: Vec<AttachmentMeta>,
    output_root: &Path,
) -> Vec<DownloadJob> {
    let mut jobs = Vec::new();
    for meta in metas {
        let matches_latest = match (meta.result_id, latest_result_id) {
            (Some(result_id), Some(latest)) => result_id == latest,
            _ => false,
        };
        if !matches_latest {
            debug!(
                "attachment {} belongs to a superseded result; discarding",
                meta.id
            );
            continue;
        }

        let filename = derive_filename(&meta);
        let file_key = format!("{test_id}_{}_{filename}", meta.id);
        let run_dir = format!("run_{run_id}");
        jobs.push(DownloadJob {
            test_id,
            attachment_id: meta.id,
            relative_path: format!("{run_dir}/{file_key}"),
            dest: output_root.join(run_dir).join(file_key),
            filename,
            declared_size: meta.size,
            content_type: meta.content_type,
        });
    }
    jobs
}

fn skipped_attachment(job: &DownloadJob, size: u64) -> ProcessedAttachment {
    ProcessedAttachment {
        name: job.filename.clone(),
        path: None,
        content_type: job
            .content_type
            .clone()
            .unwrap_or_else(|| media::guess_content_type(&job.filename).to_string()),
        size,
        is_image: media::is_image(job.content_type.as_deref(), &job.filename),
        is_video: media::is_video(job.content_type.as_deref(), &job.filename),
        inline_data: None,
        inline_embedded: false,
        skipped: true,
    }
}

async fn fetch_and_finalize(
    client: &dyn ApiClient,
    job: &DownloadJob,
    config: &PipelineConfig,
) -> anyhow::Result<ProcessedAttachment> {
    let parent = job
        .dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("destination {} has no parent", job.dest.display()))?;
    tokio::fs::create_dir_all(parent).await?;

    // Stream to a staging file next to the destination; it is removed on
    // drop unless finalization copied it onward.
    let staging = tempfile::NamedTempFile::new_in(parent)?;
    let downloaded = client
        .download(&endpoints::attachment_endpoint(job.attachment_id), staging.path())
        .await?;

    if downloaded > config.max_attachment_size {
        info!(
            "attachment {} is {downloaded} bytes (limit {}); recording as skipped",
            job.attachment_id, config.max_attachment_size
        );
        return Ok(skipped_attachment(job, downloaded));
    }

    let outcome = media::finalize(
        staging.path(),
        &job.dest,
        job.content_type.as_deref(),
        &job.filename,
        config,
    )?;

    let is_video = media::is_video(job.content_type.as_deref(), &job.filename);
    let inline_data = if outcome.size <= config.inline_threshold {
        Some(media::inline_data_uri(&job.dest, &outcome.content_type)?)
    } else {
        None
    };

    Ok(ProcessedAttachment {
        name: job.filename.clone(),
        path: Some(job.relative_path.clone()),
        content_type: outcome.content_type,
        size: outcome.size,
        is_image: outcome.is_image,
        is_video,
        inline_embedded: inline_data.is_some(),
        inline_data,
        skipped: false,
    })
}

/// Execute a run's download jobs sequentially, in job order.
///
/// Each job is consumed exactly once. A failed download is logged and
/// recorded as skipped; it never interrupts the rest of the run.
pub async fn download_all(
    client: &dyn ApiClient,
    jobs: Vec<DownloadJob>,
    config: &PipelineConfig,
) -> Vec<(u64, ProcessedAttachment)> {
    let mut out = Vec::with_capacity(jobs.len());
    for job in jobs {
        let processed = match fetch_and_finalize(client, &job, config).await {
            Ok(processed) => processed,
            Err(e) => {
                warn!(
                    "attachment {} for test {} failed: {e}; recording as skipped",
                    job.attachment_id, job.test_id
                );
                skipped_attachment(&job, job.declared_size)
            }
        };
        out.push((job.test_id, processed));
    }
    out
}
