//! Object storage for project images.
//!
//! [`BlobStore`] is the seam between the upload orchestrator and the
//! storage backend. Production uses [`HttpBlobStore`]; tests use
//! [`MemoryBlobStore`].

pub mod http;
pub mod memory;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;

/// Errors returned by a blob store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed before a response arrived.
    #[error("storage request failed: {0}")]
    Request(String),

    /// Storage backend rejected the object.
    #[error("storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Write-only access to a public bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key` and return its public URL.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StorageError>;
}
