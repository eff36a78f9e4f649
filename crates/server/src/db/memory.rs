//! In-memory stores for tests and local runs without a database.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use folio_core::{MessageId, ProjectId};

use super::{MessageStore, ProjectStore, RepositoryError};
use crate::models::{Message, NewMessage, NewProject, Project};

/// Simulated outage; every call fails while set.
#[derive(Debug, Default)]
struct Availability(AtomicBool);

impl Availability {
    fn check(&self) -> Result<(), RepositoryError> {
        if self.0.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Project store held in memory.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    rows: Mutex<Vec<Project>>,
    next_id: AtomicI32,
    offline: Availability,
}

impl MemoryProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.0.store(offline, Ordering::SeqCst);
    }

    /// Number of stored projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn insert(&self, project: NewProject) -> Result<Project, RepositoryError> {
        self.offline.check()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Project {
            id: ProjectId::new(id),
            title: project.title,
            description: project.description,
            project_type: project.project_type,
            demo_link: project.demo_link,
            repo_link: project.repo_link,
            tags: project.tags,
            images: project.images,
            created_at: Utc::now(),
        };

        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        self.offline.check()?;

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        self.offline.check()?;

        let mut rows = self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        rows.sort_by(|a, b| {
            (b.created_at, b.id.as_i32()).cmp(&(a.created_at, a.id.as_i32()))
        });
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.offline.check()
    }
}

/// Message store held in memory.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    rows: Mutex<Vec<Message>>,
    next_id: AtomicI32,
    offline: Availability,
}

impl MemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.0.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn insert(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        self.offline.check()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Message {
            id: MessageId::new(id),
            name: message.name,
            email: message.email,
            subject: message.subject,
            content: message.content,
            created_at: Utc::now(),
        };

        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError> {
        self.offline.check()?;

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = rows.len();
        rows.retain(|m| m.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self) -> Result<Vec<Message>, RepositoryError> {
        self.offline.check()?;

        let mut rows = self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        rows.sort_by(|a, b| {
            (b.created_at, b.id.as_i32()).cmp(&(a.created_at, a.id.as_i32()))
        });
        Ok(rows)
    }
}
