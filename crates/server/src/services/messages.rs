//! Contact message mutations.

use std::sync::Arc;

use tracing::{info, instrument};

use folio_core::{MessageId, Role};

use super::cache::{ListingCache, ReadPath};
use super::error::MutationError;
use crate::db::MessageStore;
use crate::models::{Message, NewMessage};

/// Contact messages: anyone may write, demo and admin may read, admin may
/// delete.
#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<dyn MessageStore>,
    cache: ListingCache,
}

impl std::fmt::Debug for MessageRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRepository")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl MessageRepository {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, cache: ListingCache) -> Self {
        Self { store, cache }
    }

    /// Record a message from the public contact form.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if name, email, or content is blank, and `Store`
    /// if persistence fails.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        content: &str,
    ) -> Result<Message, MutationError> {
        let new_message = NewMessage::parse(name, email, subject, content)?;
        let message = self.store.insert(new_message).await?;
        self.cache.invalidate(&[ReadPath::AdminListing]).await;

        info!(id = %message.id, "Contact message received");
        Ok(message)
    }

    /// All messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Permission` for callers with no role and `Store` if the
    /// listing is not cached and the store fails.
    pub async fn list(&self, role: Role) -> Result<Arc<Vec<Message>>, MutationError> {
        if !role.can_read_inbox() {
            return Err(MutationError::Permission);
        }

        if let Some(messages) = self.cache.messages().await {
            return Ok(messages);
        }

        let seen = self.cache.generation(ReadPath::AdminListing);
        let messages = Arc::new(self.store.list().await?);
        self.cache.store_messages(seen, Arc::clone(&messages)).await;
        Ok(messages)
    }

    /// Delete a message by id.
    ///
    /// # Errors
    ///
    /// Returns `Permission` for non-admin callers, `NotFound` if no message
    /// has this id, and `Store` if persistence fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, role: Role, id: MessageId) -> Result<(), MutationError> {
        if !role.can_mutate() {
            return Err(MutationError::Permission);
        }

        if !self.store.delete(id).await? {
            return Err(MutationError::NotFound);
        }
        self.cache.invalidate(&[ReadPath::AdminListing]).await;

        info!("Message deleted");
        Ok(())
    }
}
