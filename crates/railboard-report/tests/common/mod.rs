//! Shared test double for the API client capability.

use async_trait::async_trait;
use railboard_api::{ApiClient, ApiError, ApiResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// In-memory API double. Exact endpoint strings map to JSON responses or
/// binary payloads; per-prefix delays simulate out-of-order completion.
#[derive(Default)]
pub struct MockApi {
    json: HashMap<String, Value>,
    bytes: HashMap<String, Vec<u8>>,
    delays: Vec<(String, Duration)>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, endpoint: &str, value: Value) -> Self {
        self.json.insert(endpoint.to_string(), value);
        self
    }

    /// Register a single-page list response the way the pagination layer
    /// will request it (offset 0, given page size).
    pub fn with_page(mut self, endpoint: &str, page_size: usize, items: Value) -> Self {
        self.json
            .insert(format!("{endpoint}?limit={page_size}&offset=0"), items);
        self
    }

    pub fn with_bytes(mut self, endpoint: &str, bytes: Vec<u8>) -> Self {
        self.bytes.insert(endpoint.to_string(), bytes);
        self
    }

    pub fn with_delay(mut self, prefix: &str, delay: Duration) -> Self {
        self.delays.push((prefix.to_string(), delay));
        self
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn get(&self, endpoint: &str) -> ApiResult<Value> {
        for (prefix, delay) in &self.delays {
            if endpoint.starts_with(prefix.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }
        self.json.get(endpoint).cloned().ok_or_else(|| ApiError::Status {
            code: 404,
            body: format!("no mock for {endpoint}"),
        })
    }

    async fn download(&self, endpoint: &str, dest: &Path) -> ApiResult<u64> {
        let bytes = self.bytes.get(endpoint).ok_or_else(|| ApiError::Status {
            code: 404,
            body: format!("no mock payload for {endpoint}"),
        })?;
        tokio::fs::write(dest, bytes).await?;
        Ok(bytes.len() as u64)
    }
}
