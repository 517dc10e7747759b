//! The railboard report pipeline.
//!
//! Orchestrates the whole generation: run resolution, bounded-concurrency
//! fetching, row aggregation (via `railboard-core`), the attachment
//! pipeline, and final context assembly. The rendered markup itself is
//! produced behind the [`ReportRenderer`] capability; the pipeline only
//! hands over an opaque context.

pub mod assembler;
pub mod attachments;
pub mod fetcher;
pub mod generate;
pub mod media;
pub mod render;
pub mod resolve;

pub use generate::{generate_report, GenerateOptions};
pub use render::{HtmlRenderer, ReportRenderer};
pub use resolve::ReportTarget;
