//! Listing cache.
//!
//! Reads of the public project listing and the admin message listing go
//! through [`ListingCache`]. Mutations call [`ListingCache::invalidate`] with
//! the paths they affect so the next read reloads from the store. Entries also
//! expire after five minutes.
//!
//! Each path carries a generation that `invalidate` bumps. A reader captures
//! the generation before loading from the store and its result is only kept if
//! no invalidation happened in between, so a slow read can never put a
//! pre-mutation snapshot back into the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::models::{Message, Project};

const LISTING_TTL: Duration = Duration::from_secs(300);

/// A cached read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPath {
    /// Project listing shown to every visitor.
    PublicListing,
    /// Message inbox shown to admin and demo sessions.
    AdminListing,
}

/// Invalidation count of a [`ReadPath`] at the time a store read began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Cached listing contents.
#[derive(Debug, Clone)]
pub enum Listing {
    Projects(Arc<Vec<Project>>),
    Messages(Arc<Vec<Message>>),
}

/// Shared listing cache; cloning shares the underlying entries.
#[derive(Clone)]
pub struct ListingCache {
    entries: Cache<ReadPath, Listing>,
    generations: Arc<[AtomicU64; 2]>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl ListingCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(16)
                .time_to_live(LISTING_TTL)
                .build(),
            generations: Arc::new([AtomicU64::new(0), AtomicU64::new(0)]),
        }
    }

    fn counter(&self, path: ReadPath) -> &AtomicU64 {
        let [public, admin] = &*self.generations;
        match path {
            ReadPath::PublicListing => public,
            ReadPath::AdminListing => admin,
        }
    }

    /// Current generation of `path`. Capture it before reading the store.
    #[must_use]
    pub fn generation(&self, path: ReadPath) -> Generation {
        Generation(self.counter(path).load(Ordering::SeqCst))
    }

    /// Insert `listing` unless `path` was invalidated since `seen`.
    async fn store(&self, path: ReadPath, seen: Generation, listing: Listing) {
        if self.generation(path) != seen {
            debug!(?path, "Discarding listing read across an invalidation");
            return;
        }
        self.entries.insert(path, listing).await;

        // An invalidation may have landed between the check and the insert.
        if self.generation(path) != seen {
            self.entries.invalidate(&path).await;
        }
    }

    /// Cached projects, if the public listing is fresh.
    pub async fn projects(&self) -> Option<Arc<Vec<Project>>> {
        match self.entries.get(&ReadPath::PublicListing).await {
            Some(Listing::Projects(projects)) => {
                debug!("Cache hit for public listing");
                Some(projects)
            }
            _ => None,
        }
    }

    /// Cached messages, if the admin listing is fresh.
    pub async fn messages(&self) -> Option<Arc<Vec<Message>>> {
        match self.entries.get(&ReadPath::AdminListing).await {
            Some(Listing::Messages(messages)) => {
                debug!("Cache hit for admin listing");
                Some(messages)
            }
            _ => None,
        }
    }

    /// Cache a project listing read at generation `seen`.
    pub async fn store_projects(&self, seen: Generation, projects: Arc<Vec<Project>>) {
        self.store(ReadPath::PublicListing, seen, Listing::Projects(projects))
            .await;
    }

    /// Cache a message listing read at generation `seen`.
    pub async fn store_messages(&self, seen: Generation, messages: Arc<Vec<Message>>) {
        self.store(ReadPath::AdminListing, seen, Listing::Messages(messages))
            .await;
    }

    /// Mark `paths` stale. Paths that are not cached are ignored.
    pub async fn invalidate(&self, paths: &[ReadPath]) {
        for path in paths {
            self.counter(*path).fetch_add(1, Ordering::SeqCst);
            self.entries.invalidate(path).await;
        }
        debug!(?paths, "Listings invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_drops_only_named_paths() {
        let cache = ListingCache::new();
        cache
            .store_projects(cache.generation(ReadPath::PublicListing), Arc::new(Vec::new()))
            .await;
        cache
            .store_messages(cache.generation(ReadPath::AdminListing), Arc::new(Vec::new()))
            .await;

        cache.invalidate(&[ReadPath::PublicListing]).await;

        assert!(cache.projects().await.is_none());
        assert!(cache.messages().await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_uncached_path_is_noop() {
        let cache = ListingCache::new();
        cache
            .invalidate(&[ReadPath::PublicListing, ReadPath::AdminListing])
            .await;
        assert!(cache.projects().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = ListingCache::new();
        let other = cache.clone();
        cache
            .store_projects(cache.generation(ReadPath::PublicListing), Arc::new(Vec::new()))
            .await;
        assert!(other.projects().await.is_some());
    }

    #[tokio::test]
    async fn test_read_spanning_invalidation_is_not_cached() {
        let cache = ListingCache::new();
        let seen = cache.generation(ReadPath::PublicListing);

        cache.invalidate(&[ReadPath::PublicListing]).await;
        cache.store_projects(seen, Arc::new(Vec::new())).await;

        assert!(cache.projects().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidation_of_other_path_keeps_read() {
        let cache = ListingCache::new();
        let seen = cache.generation(ReadPath::PublicListing);

        cache.invalidate(&[ReadPath::AdminListing]).await;
        cache.store_projects(seen, Arc::new(Vec::new())).await;

        assert!(cache.projects().await.is_some());
    }
}
