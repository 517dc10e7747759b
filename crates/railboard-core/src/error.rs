//! Error taxonomy for report generation.

use thiserror::Error;

/// Fatal errors that abort a report generation.
///
/// Everything else (a single run failing to fetch, forbidden user lookups,
/// attachment problems, odd payload shapes) degrades into the report's
/// content instead of raising.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Invalid run/plan/subset combination; generation never starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// Nothing to report on.
    #[error("no runs resolved; nothing to report")]
    NoRunsResolved,

    /// An unrecoverable top-level API failure.
    #[error("api error: {0}")]
    Api(String),
}
