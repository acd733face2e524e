//! Snapshot storage on an HTTP object store

use super::{encoded_object_name, BlobCache};
use crate::error::BlobError;
use crate::types::{CacheSnapshot, LookupKey};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Reads and writes snapshots as `{base_url}/{key}.json` with GET and PUT
pub struct HttpBlobCache {
    client: Client,
    base_url: String,
}

impl HttpBlobCache {
    /// Create a client with the default 30 second timeout
    pub fn new(base_url: &str) -> Result<Self, BlobError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BlobError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn object_url(&self, key: &LookupKey) -> String {
        format!("{}/{}", self.base_url, encoded_object_name(key))
    }
}

#[async_trait]
impl BlobCache for HttpBlobCache {
    async fn get(&self, key: &LookupKey) -> Result<Option<CacheSnapshot>, BlobError> {
        let url = self.object_url(key);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(key = %key, url = %url, "Snapshot object not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            debug!(status = %response.status(), url = %url, "Failed to read snapshot object");
            return Err(BlobError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn put(&self, key: &LookupKey, snapshot: &CacheSnapshot) -> Result<(), BlobError> {
        let url = self.object_url(key);
        let body = serde_json::to_vec(snapshot)?;

        let response = self
            .client
            .put(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BlobError::Status(response.status().as_u16()));
        }

        debug!(key = %key, url = %url, "Wrote snapshot object");
        Ok(())
    }
}
