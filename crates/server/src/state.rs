//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::{MessageStore, PgMessageStore, PgProjectStore, ProjectStore, RepositoryError};
use crate::services::{
    AssetUploadOrchestrator, ListingCache, MessageRepository, ProjectRepository, SessionResolver,
};
use crate::storage::{BlobStore, HttpBlobStore};

/// Backends and settings the state is built from.
///
/// Production builds this from [`SiteConfig`]; tests pass in-memory stores.
pub struct Components {
    pub project_store: Arc<dyn ProjectStore>,
    pub message_store: Arc<dyn MessageStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub admin_secret: SecretString,
    pub upload_limit_bytes: usize,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Every service is constructed
/// once here and handed to handlers; nothing is reached through globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    sessions: SessionResolver,
    projects: ProjectRepository,
    messages: MessageRepository,
    uploads: AssetUploadOrchestrator,
    project_store: Arc<dyn ProjectStore>,
}

impl AppState {
    /// Build state from explicit components.
    #[must_use]
    pub fn from_components(components: Components) -> Self {
        let cache = ListingCache::new();

        Self {
            inner: Arc::new(AppStateInner {
                sessions: SessionResolver::new(components.admin_secret),
                projects: ProjectRepository::new(
                    Arc::clone(&components.project_store),
                    cache.clone(),
                ),
                messages: MessageRepository::new(components.message_store, cache),
                uploads: AssetUploadOrchestrator::new(
                    components.blob_store,
                    components.upload_limit_bytes,
                ),
                project_store: components.project_store,
            }),
        }
    }

    /// Build production state backed by `PostgreSQL` and HTTP object storage.
    #[must_use]
    pub fn new(config: &SiteConfig, pool: PgPool) -> Self {
        Self::from_components(Components {
            project_store: Arc::new(PgProjectStore::new(pool.clone())),
            message_store: Arc::new(PgMessageStore::new(pool)),
            blob_store: Arc::new(HttpBlobStore::new(&config.storage)),
            admin_secret: config.admin_secret.clone(),
            upload_limit_bytes: config.upload_limit_bytes,
        })
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionResolver {
        &self.inner.sessions
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectRepository {
        &self.inner.projects
    }

    #[must_use]
    pub fn messages(&self) -> &MessageRepository {
        &self.inner.messages
    }

    #[must_use]
    pub fn uploads(&self) -> &AssetUploadOrchestrator {
        &self.inner.uploads
    }

    /// Check the persistence store is reachable.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be reached.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.project_store.ping().await
    }
}
