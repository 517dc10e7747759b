//! Typed records for the report pipeline.
//!
//! The structs in the first half mirror the wire shapes returned by the
//! test-management API (unknown fields are ignored, missing optional fields
//! default). The second half holds the assembled output types that end up in
//! the rendering context, all serializable so the renderer can treat the
//! context as an opaque structure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The project a report is generated for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A named collection of test executions within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A named collection of runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

/// One entry of a plan; carries the runs in the plan's declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    #[serde(default)]
    pub runs: Vec<Run>,
}

/// One test case instance within a run.
///
/// `status_id` on the test record is the authoritative current status; the
/// latest result is consulted only when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub priority_id: Option<u64>,
    #[serde(default)]
    pub assignedto_id: Option<u64>,
    #[serde(default)]
    pub refs: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
}

/// A historical outcome record for a test. Zero or more exist per test;
/// only the one with the greatest `created_on` (ties broken by greatest
/// `id`) is retained as the "latest result".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: u64,
    pub test_id: u64,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_on: i64,
    #[serde(default)]
    pub assignedto_id: Option<u64>,
}

/// Attachment metadata as listed by the API. Only entries whose `result_id`
/// equals the test's latest result id are eligible for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub result_id: Option<u64>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Ephemeral record consumed exactly once by the download step.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub test_id: u64,
    pub attachment_id: u64,
    pub filename: String,
    pub dest: PathBuf,
    pub relative_path: String,
    pub declared_size: u64,
    pub content_type: Option<String>,
}

/// Final, immutable attachment record carried by a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedAttachment {
    pub name: String,
    /// Relative on-disk path under the output directory, `None` when the
    /// attachment was skipped.
    pub path: Option<String>,
    pub content_type: String,
    /// Size of the bytes actually written (downloaded size, not the
    /// declared one).
    pub size: u64,
    pub is_image: bool,
    pub is_video: bool,
    /// Base64 data URI when the payload fits the inline threshold.
    pub inline_data: Option<String>,
    pub inline_embedded: bool,
    pub skipped: bool,
}

/// Merge of one test with its latest result and processed attachments.
/// Exactly one row exists per test id per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub test_id: u64,
    pub title: String,
    pub status_id: i64,
    pub status: String,
    pub assignee: String,
    pub priority: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub refs: Option<String>,
    #[serde(default)]
    pub attachments: Vec<ProcessedAttachment>,
}

/// One proportional arc of the status-distribution radial chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSegment {
    pub label: String,
    pub count: u64,
    pub percent: f64,
    pub start: f64,
    pub end: f64,
    pub color: String,
}

/// Chart data handed to the renderer: a CSS-style descriptor for the
/// proportional ring plus the legend segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub style: String,
    pub segments: Vec<ChartSegment>,
}

/// Per-run summary, immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: u64,
    pub run_name: String,
    pub rows: Vec<Row>,
    pub counts: BTreeMap<String, u64>,
    pub passed: u64,
    pub total: u64,
    pub pass_rate: f64,
    pub chart: Chart,
}

/// Overall counts across all runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub counts: BTreeMap<String, u64>,
    pub passed: u64,
    pub total: u64,
    pub pass_rate: f64,
}

/// Aggregate of all run summaries plus report metadata. Built once, handed
/// to the renderer, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    pub title: String,
    pub generated_at: String,
    pub overall: SummaryTotals,
    pub overall_chart: Chart,
    pub runs: Vec<RunSummary>,
    pub file_name: String,
}
