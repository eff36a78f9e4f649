//! In-memory blob store for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;

use super::{BlobStore, StorageError};

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Default)]
struct Rules {
    /// Bodies that fail to upload.
    failing: Vec<Bytes>,
    /// Artificial latency per body.
    delays: HashMap<Bytes, Duration>,
}

/// Blob store that keeps objects in memory.
///
/// Uploads can be made to fail or to stall by matching on the body, which
/// lets tests decide the outcome of each file independently of its key.
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: Mutex<Vec<StoredBlob>>,
    rules: Mutex<Rules>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("https://blobs.test")
    }
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(Vec::new()),
            rules: Mutex::new(Rules::default()),
        }
    }

    /// Reject any upload whose body equals `body`.
    pub fn fail_body(&self, body: impl Into<Bytes>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failing
            .push(body.into());
    }

    /// Hold any upload whose body equals `body` for `delay` before storing it.
    pub fn delay_body(&self, body: impl Into<Bytes>, delay: Duration) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .delays
            .insert(body.into(), delay);
    }

    /// Objects stored so far, in completion order.
    #[must_use]
    pub fn objects(&self) -> Vec<StoredBlob> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StorageError> {
        let (fails, delay) = {
            let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
            (
                rules.failing.contains(&body),
                rules.delays.get(&body).copied(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fails {
            return Err(StorageError::Rejected {
                status: 500,
                body: "simulated failure".to_string(),
            });
        }

        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredBlob {
                key: key.to_string(),
                content_type: content_type.to_string(),
                body,
            });

        Ok(format!("{}/{key}", self.base_url))
    }
}
