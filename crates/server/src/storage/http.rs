//! Blob store speaking the Supabase-style storage REST API.

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::{BlobStore, StorageError};
use crate::config::StorageConfig;

/// Uploads objects with `POST {endpoint}/object/{bucket}/{key}`.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
    service_key: SecretString,
    public_base: String,
}

impl std::fmt::Debug for HttpBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBlobStore")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl HttpBlobStore {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
            public_base: config.public_base.trim_end_matches('/').to_string(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self, body), fields(bucket = %self.bucket, size = body.len()))]
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .post(format!("{}/object/{}/{key}", self.endpoint, self.bucket))
            .bearer_auth(self.service_key.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(key, "Object stored");
        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            endpoint: "https://storage.test/storage/v1/".to_string(),
            bucket: "portfolio-images".to_string(),
            service_key: SecretString::from("service-key"),
            public_base: "https://cdn.test/portfolio-images/".to_string(),
        }
    }

    #[test]
    fn test_public_url_joins_without_double_slash() {
        let store = HttpBlobStore::new(&config());
        assert_eq!(
            store.public_url("1700000000000-abc.png"),
            "https://cdn.test/portfolio-images/1700000000000-abc.png"
        );
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let store = HttpBlobStore::new(&config());
        let debug = format!("{store:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("service-key"));
    }
}
