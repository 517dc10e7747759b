//! API access for railboard.
//!
//! The pipeline consumes the remote test-management API through the
//! [`ApiClient`] capability: an authenticated GET returning decoded JSON, and
//! a streaming download for attachment payloads. [`RestClient`] is the
//! production reqwest-backed implementation. Retry/backoff is deliberately
//! not implemented here; a failed call surfaces as an [`ApiError`] and the
//! caller decides whether it is fatal.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod pagination;
pub mod telemetry;
pub mod users;

pub use client::{ApiClient, RestClient};
pub use error::{ApiError, ApiResult};
pub use pagination::{fetch_all_pages, PagePayload};
pub use telemetry::FetchTelemetry;
pub use users::UserLookup;
