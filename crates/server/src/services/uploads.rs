//! Cover-first asset upload.
//!
//! The cover is mandatory and fatal on failure; gallery images are best
//! effort. The returned URL list always starts with the cover and keeps the
//! gallery's submitted order, whatever order the uploads finish in.

use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::storage::{BlobStore, StorageError};

const KEY_TOKEN_LEN: usize = 12;
const MAX_EXTENSION_LEN: usize = 8;
const FALLBACK_EXTENSION: &str = "bin";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors that abort an upload before anything is persisted.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No cover file, or an empty one.
    #[error("A cover image is required.")]
    MissingCover,

    /// Combined size of all files is over the limit.
    #[error("Upload is too large ({actual} bytes, limit {limit} bytes).")]
    TooLarge { limit: usize, actual: usize },

    /// The cover could not be stored.
    #[error("cover upload failed: {0}")]
    Storage(#[from] StorageError),
}

/// A file received from a form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UploadedFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Lowercased extension of the original file name, if it is usable in a key.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        let valid = !ext.is_empty()
            && ext.len() <= MAX_EXTENSION_LEN
            && ext.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    }

    /// Content type to store the file under.
    ///
    /// A known image extension wins over the declared type. Otherwise the
    /// declared type is kept only if it is a raster `image/*` type.
    #[must_use]
    pub fn resolved_content_type(&self) -> String {
        let inferred = match self.extension().as_deref() {
            Some("jpg" | "jpeg") => Some("image/jpeg"),
            Some("png") => Some("image/png"),
            Some("gif") => Some("image/gif"),
            Some("webp") => Some("image/webp"),
            Some("avif") => Some("image/avif"),
            _ => None,
        };
        if let Some(inferred) = inferred {
            return inferred.to_string();
        }

        self.content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/") && !ct.contains("svg"))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}

/// Build a collision-resistant storage key: `<unix-millis>-<token>.<ext>`.
#[must_use]
pub fn storage_key(file: &UploadedFile) -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_TOKEN_LEN)
        .map(char::from)
        .collect();
    let ext = file
        .extension()
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    format!("{}-{token}.{ext}", Utc::now().timestamp_millis())
}

/// Uploads a project's cover and gallery to the blob store.
#[derive(Clone)]
pub struct AssetUploadOrchestrator {
    store: Arc<dyn BlobStore>,
    limit_bytes: usize,
}

impl std::fmt::Debug for AssetUploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetUploadOrchestrator")
            .field("limit_bytes", &self.limit_bytes)
            .finish_non_exhaustive()
    }
}

impl AssetUploadOrchestrator {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, limit_bytes: usize) -> Self {
        Self { store, limit_bytes }
    }

    /// Aggregate byte limit for one call.
    #[must_use]
    pub const fn limit_bytes(&self) -> usize {
        self.limit_bytes
    }

    /// Check the request shape without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `MissingCover` for an absent or empty cover and `TooLarge` when
    /// the files together exceed the limit.
    pub fn precheck(
        &self,
        cover: Option<&UploadedFile>,
        gallery: &[UploadedFile],
    ) -> Result<(), UploadError> {
        let cover = cover
            .filter(|c| !c.is_empty())
            .ok_or(UploadError::MissingCover)?;

        let actual = gallery
            .iter()
            .map(UploadedFile::len)
            .fold(cover.len(), usize::saturating_add);
        if actual > self.limit_bytes {
            return Err(UploadError::TooLarge {
                limit: self.limit_bytes,
                actual,
            });
        }

        Ok(())
    }

    /// Upload the cover, then the gallery, and return their public URLs.
    ///
    /// The cover URL is always first. Gallery failures are logged and the
    /// failed items left out; empty gallery parts are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MissingCover` or `TooLarge` before any upload, or `Storage`
    /// if the cover upload fails.
    #[instrument(skip_all, fields(gallery = gallery.len()))]
    pub async fn upload_project_assets(
        &self,
        cover: Option<UploadedFile>,
        gallery: Vec<UploadedFile>,
    ) -> Result<Vec<String>, UploadError> {
        self.precheck(cover.as_ref(), &gallery)?;
        let cover = cover.ok_or(UploadError::MissingCover)?;

        let cover_url = self.put(&cover).await?;

        let uploads = gallery
            .iter()
            .enumerate()
            .filter(|(_, file)| !file.is_empty())
            .map(|(index, file)| async move {
                match self.put(file).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!(
                            index,
                            file_name = %file.file_name,
                            error = %e,
                            "Gallery image upload failed, skipping"
                        );
                        None
                    }
                }
            });
        let slots = join_all(uploads).await;

        let mut urls = Vec::with_capacity(slots.len() + 1);
        urls.push(cover_url);
        urls.extend(slots.into_iter().flatten());

        debug!(stored = urls.len(), "Project assets uploaded");
        Ok(urls)
    }

    async fn put(&self, file: &UploadedFile) -> Result<String, StorageError> {
        let key = storage_key(file);
        self.store
            .put(&key, &file.resolved_content_type(), file.body.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryBlobStore;

    fn file(name: &str, body: &'static [u8]) -> UploadedFile {
        UploadedFile::new(name, None, Bytes::from_static(body))
    }

    fn orchestrator(store: &Arc<MemoryBlobStore>, limit: usize) -> AssetUploadOrchestrator {
        AssetUploadOrchestrator::new(Arc::clone(store) as Arc<dyn BlobStore>, limit)
    }

    #[tokio::test]
    async fn test_cover_is_first() {
        let store = Arc::new(MemoryBlobStore::default());
        let urls = orchestrator(&store, 1024)
            .upload_project_assets(
                Some(file("cover.png", b"cover")),
                vec![file("a.jpg", b"a"), file("b.jpg", b"b")],
            )
            .await
            .unwrap();

        assert_eq!(urls.len(), 3);
        let objects = store.objects();
        let cover = objects
            .iter()
            .find(|o| o.body == Bytes::from_static(b"cover"))
            .unwrap();
        assert_eq!(urls[0], format!("https://blobs.test/{}", cover.key));
        assert_eq!(cover.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_missing_cover_uploads_nothing() {
        let store = Arc::new(MemoryBlobStore::default());
        let orch = orchestrator(&store, 1024);

        let result = orch
            .upload_project_assets(None, vec![file("a.jpg", b"a")])
            .await;
        assert!(matches!(result, Err(UploadError::MissingCover)));

        let result = orch
            .upload_project_assets(Some(file("cover.png", b"")), vec![file("a.jpg", b"a")])
            .await;
        assert!(matches!(result, Err(UploadError::MissingCover)));

        assert!(store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_too_large_uploads_nothing() {
        let store = Arc::new(MemoryBlobStore::default());
        let result = orchestrator(&store, 8)
            .upload_project_assets(
                Some(file("cover.png", b"12345")),
                vec![file("a.jpg", b"6789")],
            )
            .await;

        assert!(matches!(
            result,
            Err(UploadError::TooLarge {
                limit: 8,
                actual: 9
            })
        ));
        assert!(store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_cover_failure_is_fatal() {
        let store = Arc::new(MemoryBlobStore::default());
        store.fail_body(Bytes::from_static(b"cover"));

        let result = orchestrator(&store, 1024)
            .upload_project_assets(Some(file("cover.png", b"cover")), vec![file("a.jpg", b"a")])
            .await;

        assert!(matches!(result, Err(UploadError::Storage(_))));
        assert!(store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_failed_gallery_item_is_dropped_in_order() {
        let store = Arc::new(MemoryBlobStore::default());
        store.fail_body(Bytes::from_static(b"second"));

        let urls = orchestrator(&store, 1024)
            .upload_project_assets(
                Some(file("cover.png", b"cover")),
                vec![
                    file("1.png", b"first"),
                    file("2.png", b"second"),
                    file("3.png", b"third"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(urls.len(), 3);
        let body_of = |url: &str| {
            store
                .objects()
                .into_iter()
                .find(|o| url.ends_with(&o.key))
                .map(|o| o.body)
                .unwrap()
        };
        assert_eq!(body_of(&urls[0]), Bytes::from_static(b"cover"));
        assert_eq!(body_of(&urls[1]), Bytes::from_static(b"first"));
        assert_eq!(body_of(&urls[2]), Bytes::from_static(b"third"));
    }

    #[tokio::test]
    async fn test_order_ignores_completion_order() {
        let store = Arc::new(MemoryBlobStore::default());
        store.delay_body(Bytes::from_static(b"slow"), Duration::from_millis(50));

        let urls = orchestrator(&store, 1024)
            .upload_project_assets(
                Some(file("cover.png", b"cover")),
                vec![file("1.png", b"slow"), file("2.png", b"fast")],
            )
            .await
            .unwrap();

        let objects = store.objects();
        let completed: Vec<_> = objects.iter().map(|o| o.body.clone()).collect();
        assert_eq!(
            completed,
            vec![
                Bytes::from_static(b"cover"),
                Bytes::from_static(b"fast"),
                Bytes::from_static(b"slow"),
            ]
        );

        let slow = objects
            .iter()
            .find(|o| o.body == Bytes::from_static(b"slow"))
            .unwrap();
        assert!(urls[1].ends_with(&slow.key));
    }

    #[tokio::test]
    async fn test_empty_gallery_parts_are_skipped() {
        let store = Arc::new(MemoryBlobStore::default());
        let urls = orchestrator(&store, 1024)
            .upload_project_assets(Some(file("cover.png", b"cover")), vec![file("", b"")])
            .await
            .unwrap();

        assert_eq!(urls.len(), 1);
        assert_eq!(store.objects().len(), 1);
    }

    #[test]
    fn test_storage_key_shape() {
        let key = storage_key(&file("Photo.JPG", b"x"));
        let (millis, rest) = key.split_once('-').unwrap();
        let (token, ext) = rest.split_once('.').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(token.len(), KEY_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_storage_keys_differ() {
        let f = file("a.png", b"x");
        assert_ne!(storage_key(&f), storage_key(&f));
    }

    #[test]
    fn test_content_type_resolution() {
        assert_eq!(file("a.webp", b"x").resolved_content_type(), "image/webp");
        assert_eq!(
            file("noext", b"x").resolved_content_type(),
            "application/octet-stream"
        );
        let declared = UploadedFile::new("a.raw", Some("image/x-custom".to_string()), "x");
        assert_eq!(declared.resolved_content_type(), "image/x-custom");
    }

    #[test]
    fn test_declared_markup_is_not_stored_as_markup() {
        let labelled = UploadedFile::new("a.png", Some("text/html".to_string()), "x");
        assert_eq!(labelled.resolved_content_type(), "image/png");

        let html = UploadedFile::new("page.html", Some("text/html".to_string()), "x");
        assert_eq!(html.resolved_content_type(), "application/octet-stream");

        let svg = UploadedFile::new("logo.svg", Some("image/svg+xml".to_string()), "x");
        assert_eq!(svg.resolved_content_type(), "application/octet-stream");
    }

    #[test]
    fn test_extension_rejects_unsafe_suffix() {
        assert_eq!(file("a.tar.gz", b"x").extension().as_deref(), Some("gz"));
        assert_eq!(file("a./etc", b"x").extension(), None);
        assert_eq!(file("a.", b"x").extension(), None);
    }
}
