//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use nativeiq_core::session::{number, SessionData, SessionKey, SessionRecord};
use nativeiq_core::storage::{
    ProvisionError, ProvisionOutcome, Result, SessionRepository, StorageError, UnavailableKind,
};

/// In-memory session store.
///
/// Data is not persisted and will be lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<BTreeMap<SessionKey, SessionRecord>>>,
    provisioned: Arc<AtomicBool>,
    outage: Arc<Mutex<Option<UnavailableKind>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the backing service failing every request with `kind`,
    /// or restores it with `None`.
    pub fn set_outage(&self, kind: Option<UnavailableKind>) {
        if let Ok(mut outage) = self.outage.lock() {
            *outage = kind;
        }
    }

    fn check_available(&self, operation: &'static str) -> Result<()> {
        let outage = self.outage.lock().ok().and_then(|outage| *outage);
        match outage {
            Some(kind) => Err(StorageError::unavailable(
                kind,
                operation,
                "simulated outage",
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn put(&self, key: &SessionKey, mut session_data: SessionData) -> Result<()> {
        self.check_available("put")?;
        number::normalize(&mut session_data);
        let now = Utc::now();

        let mut records = self.records.write().await;
        let record = match records.get(key) {
            Some(existing) => existing.overwrite(session_data, now),
            None => SessionRecord::new(key.clone(), session_data, now),
        };
        records.insert(key.clone(), record);

        tracing::debug!(%key, "session stored");
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<SessionRecord>> {
        self.check_available("get")?;
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn delete(&self, key: &SessionKey) -> Result<()> {
        self.check_available("delete")?;
        let mut records = self.records.write().await;
        records.remove(key);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        self.check_available("list_for_user")?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.key.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn provision(
        &self,
        _max_wait: Duration,
    ) -> std::result::Result<ProvisionOutcome, ProvisionError> {
        self.check_available("provision")?;
        if self.provisioned.swap(true, Ordering::SeqCst) {
            Ok(ProvisionOutcome::AlreadyExists)
        } else {
            Ok(ProvisionOutcome::Created)
        }
    }
}
