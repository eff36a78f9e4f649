//! Project mutations.

use std::sync::Arc;

use tracing::{error, info, instrument};

use folio_core::{ProjectId, Role};

use super::cache::{ListingCache, ReadPath};
use super::error::MutationError;
use super::uploads::{AssetUploadOrchestrator, UploadedFile};
use crate::db::ProjectStore;
use crate::models::{Project, ProjectDraft};

/// Listings that show projects.
const PROJECT_PATHS: &[ReadPath] = &[ReadPath::PublicListing, ReadPath::AdminListing];

/// Permission-gated access to projects.
#[derive(Clone)]
pub struct ProjectRepository {
    store: Arc<dyn ProjectStore>,
    cache: ListingCache,
}

impl std::fmt::Debug for ProjectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRepository")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ProjectRepository {
    #[must_use]
    pub fn new(store: Arc<dyn ProjectStore>, cache: ListingCache) -> Self {
        Self { store, cache }
    }

    /// Upload a project's images and persist it.
    ///
    /// The role is checked before anything else, and the text fields and
    /// upload shape before any byte is sent to storage.
    ///
    /// # Errors
    ///
    /// Returns `Permission` for non-admin callers, `Validation` or `Upload`
    /// for bad input, and `Store` if persistence fails. A store failure after
    /// upload leaves the uploaded images orphaned.
    #[instrument(skip_all, fields(role = %role, title = %draft.title))]
    pub async fn publish(
        &self,
        role: Role,
        draft: ProjectDraft,
        cover: Option<UploadedFile>,
        gallery: Vec<UploadedFile>,
        uploads: &AssetUploadOrchestrator,
    ) -> Result<Project, MutationError> {
        if !role.can_mutate() {
            return Err(MutationError::Permission);
        }
        draft.validate()?;
        uploads.precheck(cover.as_ref(), &gallery)?;

        let images = uploads.upload_project_assets(cover, gallery).await?;

        match self.create(role, draft, images.clone()).await {
            Err(MutationError::Store(e)) => {
                error!(error = %e, orphaned = ?images, "Project not saved after upload");
                Err(MutationError::Store(e))
            }
            other => other,
        }
    }

    /// Persist a project whose images are already stored.
    ///
    /// # Errors
    ///
    /// Returns `Permission` for non-admin callers, `Validation` for blank
    /// fields or no images, and `Store` if persistence fails.
    pub async fn create(
        &self,
        role: Role,
        draft: ProjectDraft,
        images: Vec<String>,
    ) -> Result<Project, MutationError> {
        if !role.can_mutate() {
            return Err(MutationError::Permission);
        }

        let new_project = draft.into_new_project(images)?;
        let project = self.store.insert(new_project).await?;
        self.cache.invalidate(PROJECT_PATHS).await;

        info!(
            id = %project.id,
            cover = project.cover(),
            gallery = project.gallery().len(),
            "Project created"
        );
        Ok(project)
    }

    /// Delete a project by id.
    ///
    /// # Errors
    ///
    /// Returns `Permission` for non-admin callers, `NotFound` if no project
    /// has this id, and `Store` if persistence fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, role: Role, id: ProjectId) -> Result<(), MutationError> {
        if !role.can_mutate() {
            return Err(MutationError::Permission);
        }

        if !self.store.delete(id).await? {
            return Err(MutationError::NotFound);
        }
        self.cache.invalidate(PROJECT_PATHS).await;

        info!("Project deleted");
        Ok(())
    }

    /// All projects, newest first. Open to every caller.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the listing is not cached and the store fails.
    pub async fn list(&self) -> Result<Arc<Vec<Project>>, MutationError> {
        if let Some(projects) = self.cache.projects().await {
            return Ok(projects);
        }

        let seen = self.cache.generation(ReadPath::PublicListing);
        let projects = Arc::new(self.store.list().await?);
        self.cache.store_projects(seen, Arc::clone(&projects)).await;
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use axum::body::Bytes;
    use tokio::sync::Notify;

    use super::*;
    use crate::db::{MemoryProjectStore, RepositoryError};
    use crate::models::NewProject;
    use crate::services::UploadError;
    use crate::storage::{BlobStore, MemoryBlobStore};

    struct Fixture {
        store: Arc<MemoryProjectStore>,
        blobs: Arc<MemoryBlobStore>,
        repo: ProjectRepository,
        uploads: AssetUploadOrchestrator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryProjectStore::new());
        let blobs = Arc::new(MemoryBlobStore::default());
        Fixture {
            repo: ProjectRepository::new(
                Arc::clone(&store) as Arc<dyn ProjectStore>,
                ListingCache::new(),
            ),
            uploads: AssetUploadOrchestrator::new(
                Arc::clone(&blobs) as Arc<dyn BlobStore>,
                1024,
            ),
            store,
            blobs,
        }
    }

    fn draft() -> ProjectDraft {
        ProjectDraft {
            title: "Folio".to_string(),
            description: "Portfolio API".to_string(),
            project_type: "web".to_string(),
            tags: "React,  Python ,,Docker".to_string(),
            ..ProjectDraft::default()
        }
    }

    fn image(name: &str, body: &'static [u8]) -> UploadedFile {
        UploadedFile::new(name, None, Bytes::from_static(body))
    }

    #[tokio::test]
    async fn test_publish_as_admin_stores_cover_first() {
        let f = fixture();
        let project = f
            .repo
            .publish(
                Role::Admin,
                draft(),
                Some(image("cover.png", b"cover")),
                vec![image("g.png", b"gallery")],
                &f.uploads,
            )
            .await
            .unwrap();

        let cover_key = f
            .blobs
            .objects()
            .into_iter()
            .find(|o| o.body == Bytes::from_static(b"cover"))
            .unwrap()
            .key;
        assert!(project.images[0].ends_with(&cover_key));
        assert_eq!(project.images.len(), 2);
        assert_eq!(project.tags, vec!["React", "Python", "Docker"]);
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_admin_does_nothing() {
        for role in [Role::None, Role::Demo] {
            let f = fixture();
            let result = f
                .repo
                .publish(
                    role,
                    draft(),
                    Some(image("cover.png", b"cover")),
                    Vec::new(),
                    &f.uploads,
                )
                .await;

            assert!(matches!(result, Err(MutationError::Permission)));
            assert!(f.blobs.objects().is_empty());
            assert!(f.store.is_empty());
        }
    }

    #[tokio::test]
    async fn test_publish_missing_cover_persists_nothing() {
        let f = fixture();
        let result = f
            .repo
            .publish(
                Role::Admin,
                draft(),
                None,
                vec![image("g.png", b"gallery")],
                &f.uploads,
            )
            .await;

        assert!(matches!(
            result,
            Err(MutationError::Upload(UploadError::MissingCover))
        ));
        assert!(f.blobs.objects().is_empty());
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_publish_invalid_fields_uploads_nothing() {
        let f = fixture();
        let mut d = draft();
        d.description = "  ".to_string();

        let result = f
            .repo
            .publish(
                Role::Admin,
                d,
                Some(image("cover.png", b"cover")),
                Vec::new(),
                &f.uploads,
            )
            .await;

        assert!(matches!(result, Err(MutationError::Validation(_))));
        assert!(f.blobs.objects().is_empty());
    }

    #[tokio::test]
    async fn test_publish_survives_gallery_failure() {
        let f = fixture();
        f.blobs.fail_body(Bytes::from_static(b"two"));

        let project = f
            .repo
            .publish(
                Role::Admin,
                draft(),
                Some(image("cover.png", b"cover")),
                vec![
                    image("1.png", b"one"),
                    image("2.png", b"two"),
                    image("3.png", b"three"),
                ],
                &f.uploads,
            )
            .await
            .unwrap();

        assert_eq!(project.images.len(), 3);
        let objects = f.blobs.objects();
        let key_of = |body: &'static [u8]| {
            objects
                .iter()
                .find(|o| o.body == Bytes::from_static(body))
                .map(|o| o.key.clone())
                .unwrap()
        };
        assert!(project.images[0].ends_with(&key_of(b"cover")));
        assert!(project.images[1].ends_with(&key_of(b"one")));
        assert!(project.images[2].ends_with(&key_of(b"three")));
    }

    #[tokio::test]
    async fn test_publish_store_failure_is_reported() {
        let f = fixture();
        f.store.set_offline(true);

        let result = f
            .repo
            .publish(
                Role::Admin,
                draft(),
                Some(image("cover.png", b"cover")),
                Vec::new(),
                &f.uploads,
            )
            .await;

        assert!(matches!(result, Err(MutationError::Store(_))));
        assert_eq!(f.blobs.objects().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_images() {
        let f = fixture();
        let result = f.repo.create(Role::Admin, draft(), Vec::new()).await;
        assert!(matches!(result, Err(MutationError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let f = fixture();
        let project = f
            .repo
            .create(Role::Admin, draft(), vec!["https://cdn.test/c.png".to_string()])
            .await
            .unwrap();

        for role in [Role::None, Role::Demo] {
            let result = f.repo.delete(role, project.id).await;
            assert!(matches!(result, Err(MutationError::Permission)));
            assert_eq!(f.store.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let f = fixture();
        let keep = f
            .repo
            .create(Role::Admin, draft(), vec!["https://cdn.test/a.png".to_string()])
            .await
            .unwrap();
        let gone = f
            .repo
            .create(Role::Admin, draft(), vec!["https://cdn.test/b.png".to_string()])
            .await
            .unwrap();

        f.repo.delete(Role::Admin, gone.id).await.unwrap();

        let remaining = f.repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let f = fixture();
        let result = f.repo.delete(Role::Admin, ProjectId::new(42)).await;
        assert!(matches!(result, Err(MutationError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_reflects_create_after_cached_read() {
        let f = fixture();
        assert!(f.repo.list().await.unwrap().is_empty());

        f.repo
            .create(Role::Admin, draft(), vec!["https://cdn.test/a.png".to_string()])
            .await
            .unwrap();

        assert_eq!(f.repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_served_from_cache() {
        let f = fixture();
        f.repo
            .create(Role::Admin, draft(), vec!["https://cdn.test/a.png".to_string()])
            .await
            .unwrap();
        f.repo.list().await.unwrap();

        f.store.set_offline(true);
        assert_eq!(f.repo.list().await.unwrap().len(), 1);
    }

    /// Holds its first `list` open after reading until released.
    struct HeldListStore {
        inner: MemoryProjectStore,
        hold: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProjectStore for HeldListStore {
        async fn insert(&self, project: NewProject) -> Result<Project, RepositoryError> {
            self.inner.insert(project).await
        }

        async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError> {
            self.inner.delete(id).await
        }

        async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
            let rows = self.inner.list().await?;
            if self.hold.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_list_overlapping_create_does_not_cache_stale_rows() {
        let store = Arc::new(HeldListStore {
            inner: MemoryProjectStore::new(),
            hold: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let repo = ProjectRepository::new(
            Arc::clone(&store) as Arc<dyn ProjectStore>,
            ListingCache::new(),
        );

        let reader = tokio::spawn({
            let repo = repo.clone();
            async move { repo.list().await }
        });
        store.entered.notified().await;

        repo.create(Role::Admin, draft(), vec!["https://cdn.test/a.png".to_string()])
            .await
            .unwrap();
        store.release.notify_one();

        let overlapping = reader.await.unwrap().unwrap();
        assert!(overlapping.is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
