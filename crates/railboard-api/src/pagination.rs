//! Paginated list-endpoint handling.
//!
//! List endpoints answer in one of two shapes: a bare array, or an object
//! wrapping the array under a known key (newer API versions). The shape is
//! decoded once here, so downstream code always consumes a plain ordered
//! sequence. A page shorter than the requested page size is the last page.

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::telemetry::FetchTelemetry;
use serde_json::Value;
use std::time::Instant;
use tracing::warn;

/// One decoded page of a paginated list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum PagePayload {
    /// The endpoint answered with a bare array.
    Bare(Vec<Value>),
    /// The endpoint answered with an object wrapping the array.
    Wrapped(Vec<Value>),
}

impl PagePayload {
    /// Decode a page, accepting either response shape.
    pub fn decode(value: Value, key: &str) -> ApiResult<Self> {
        match value {
            Value::Array(items) => Ok(Self::Bare(items)),
            Value::Object(mut map) => match map.remove(key) {
                Some(Value::Array(items)) => Ok(Self::Wrapped(items)),
                _ => Err(ApiError::Decode(format!(
                    "expected an array or an object with an `{key}` array"
                ))),
            },
            other => Err(ApiError::Decode(format!(
                "expected an array or an object, got {other}"
            ))),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::Wrapped(items) => items,
        }
    }
}

/// Fetch every page of a list endpoint.
///
/// Repeats fetch-with-offset until a short page is returned. A page with an
/// unexpected shape is logged and treated as the end of the list; it never
/// raises past this boundary.
pub async fn fetch_all_pages(
    client: &dyn ApiClient,
    endpoint: &str,
    key: &str,
    page_size: usize,
    telemetry: &mut FetchTelemetry,
) -> ApiResult<Vec<Value>> {
    let mut items = Vec::new();
    let mut offset = 0usize;
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    loop {
        let page_endpoint = format!("{endpoint}{sep}limit={page_size}&offset={offset}");
        let started = Instant::now();
        let value = client.get(&page_endpoint).await?;
        telemetry.record(&page_endpoint, started.elapsed());

        let page = match PagePayload::decode(value, key) {
            Ok(page) => page.into_items(),
            Err(e) => {
                warn!("unexpected payload shape from {page_endpoint}: {e}; treating as empty");
                break;
            }
        };
        let len = page.len();
        items.extend(page);
        if len < page_size {
            break;
        }
        offset += len;
    }
    Ok(items)
}

/// Decode a whole list of JSON values into typed records, skipping (and
/// logging) entries that do not match the expected shape.
pub fn decode_items<T: serde::de::DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(decoded) => out.push(decoded),
            Err(e) => warn!("skipping malformed {what} entry: {e}"),
        }
    }
    out
}
