use std::time::Duration;

use async_trait::async_trait;

use crate::session::{SessionData, SessionKey, SessionRecord};

use super::{ProvisionError, Result};

/// Outcome of a successful provisioning call. Both variants mean "ready".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table was created by this call.
    Created,
    /// The table already existed with a compatible key schema.
    AlreadyExists,
}

/// Durable storage of session records.
///
/// Implementations must be safe to call concurrently for distinct keys.
/// Concurrent writes to the same key are last-write-wins; there is no
/// optimistic versioning.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts or replaces the session document at `key`.
    ///
    /// `created_at` is only set when no record existed; `updated_at` is
    /// refreshed on every call. Numbers are stored as
    /// [`number::normalize`](crate::session::number::normalize) leaves them,
    /// so an integral float such as `2.0` reads back as `2`.
    async fn put(&self, key: &SessionKey, session_data: SessionData) -> Result<()>;

    /// Gets the record at `key`, or `None` if nothing was ever written there.
    async fn get(&self, key: &SessionKey) -> Result<Option<SessionRecord>>;

    /// Deletes the record at `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &SessionKey) -> Result<()>;

    /// Lists every session of a user, ordered by session id.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionRecord>>;

    /// Creates the backing table if needed, waiting at most `max_wait` for it
    /// to become usable.
    async fn provision(
        &self,
        max_wait: Duration,
    ) -> std::result::Result<ProvisionOutcome, ProvisionError>;
}
