//! Core domain model and aggregation logic for railboard.
//!
//! This crate holds everything that is pure computation: the typed records
//! fetched from the test-management API, result deduplication and the
//! test/result join, row ordering, per-run and overall summaries, and the
//! chart-segment math. Nothing in here performs I/O; the fetching and
//! attachment pipelines live in `railboard-report`.

pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod status;
pub mod table;

pub use chart::{chart_for, conic_style, segments};
pub use config::PipelineConfig;
pub use error::ReportError;
pub use model::{
    AttachmentMeta, Chart, ChartSegment, DownloadJob, Plan, PlanEntry, ProcessedAttachment,
    Project, ReportContext, Row, Run, RunSummary, SummaryTotals, Test, TestResult,
};
pub use status::{
    default_priority_labels, default_status_labels, pass_rate, status_label, status_rank,
    PASSED_STATUS_ID, UNTESTED_STATUS_ID,
};
pub use table::{build_rows, latest_results, summarize_run};
