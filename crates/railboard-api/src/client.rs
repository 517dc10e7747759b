//! The API access capability and its reqwest implementation.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Authenticated access to the test-management API.
///
/// `get` performs an authenticated GET and returns decoded JSON or raises.
/// `download` streams a binary payload to `dest` without buffering it in
/// memory and returns the number of bytes written.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, endpoint: &str) -> ApiResult<serde_json::Value>;

    async fn download(&self, endpoint: &str, dest: &Path) -> ApiResult<u64>;
}

/// Production client speaking the API's v2 REST surface with basic auth.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    api_key: String,
    timeout: Duration,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            user: user.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the per-call timeout (the only timeout enforcement in the
    /// whole pipeline).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v2/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn send(&self, endpoint: &str) -> ApiResult<reqwest::Response> {
        let url = self.url(endpoint);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.user, Some(&self.api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { code, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl ApiClient for RestClient {
    async fn get(&self, endpoint: &str) -> ApiResult<serde_json::Value> {
        let response = self.send(endpoint).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn download(&self, endpoint: &str, dest: &Path) -> ApiResult<u64> {
        let response = self.send(endpoint).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::Http(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}
