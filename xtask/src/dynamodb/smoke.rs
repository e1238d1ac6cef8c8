//! Write, read back and delete one session against a live store.

use chrono::{DateTime, Utc};
use nativeiq::activity;
use nativeiq_core::session::{timestamp, SessionData, SessionKey};
use nativeiq_core::storage::SessionRepository;
use serde_json::{json, Value};

use super::error::{DynamodbError, Result};

pub const SMOKE_USER_ID: &str = "test_user_123";
pub const SMOKE_SESSION_ID: &str = "test_session_456";

/// A completed smoke test step, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeStep {
    pub name: &'static str,
    pub detail: String,
}

/// Document written by the smoke test.
pub fn smoke_document(now: DateTime<Utc>) -> SessionData {
    let mut data = SessionData::new();
    data.insert(activity::CONTACTS.to_string(), json!({}));
    data.insert(
        activity::LAST_ACTIVITY.to_string(),
        Value::String(timestamp::format(&now)),
    );
    data.insert(activity::MESSAGE_COUNT.to_string(), json!(1));
    data
}

/// Runs put, get, delete and a final get against `repo`.
///
/// Always removes the test item it wrote, even when the read-back differs.
pub async fn run_smoke_test(
    repo: &dyn SessionRepository,
    now: DateTime<Utc>,
) -> Result<Vec<SmokeStep>> {
    let key = SessionKey::new(SMOKE_USER_ID, SMOKE_SESSION_ID)
        .map_err(nativeiq_core::storage::StorageError::from)?;
    let document = smoke_document(now);
    let mut steps = Vec::new();

    repo.put(&key, document.clone()).await?;
    steps.push(SmokeStep {
        name: "put",
        detail: format!("wrote {}", key),
    });

    let read_back = repo.get(&key).await;
    repo.delete(&key).await?;

    let record = read_back?.ok_or_else(|| DynamodbError::SmokeTest {
        step: "get",
        reason: format!("{} was not found after writing it", key),
    })?;
    if record.session_data != document {
        return Err(DynamodbError::SmokeTest {
            step: "get",
            reason: "read-back document differs from the one written".to_string(),
        });
    }
    steps.push(SmokeStep {
        name: "get",
        detail: format!(
            "read {} (created_at {})",
            key,
            timestamp::format(&record.created_at)
        ),
    });
    steps.push(SmokeStep {
        name: "delete",
        detail: format!("deleted {}", key),
    });

    if repo.get(&key).await?.is_some() {
        return Err(DynamodbError::SmokeTest {
            step: "verify",
            reason: format!("{} still present after delete", key),
        });
    }
    steps.push(SmokeStep {
        name: "verify",
        detail: "item is gone".to_string(),
    });

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativeiq::storage::InMemorySessionStore;
    use nativeiq_core::storage::UnavailableKind;

    #[tokio::test]
    async fn test_smoke_test_passes_and_cleans_up() {
        let store = InMemorySessionStore::new();

        let steps = run_smoke_test(&store, Utc::now()).await.unwrap();

        let names: Vec<&str> = steps.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["put", "get", "delete", "verify"]);
        assert!(store.list_for_user(SMOKE_USER_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_smoke_test_surfaces_unavailable_store() {
        let store = InMemorySessionStore::new();
        store.set_outage(Some(UnavailableKind::Unauthorized));

        let err = run_smoke_test(&store, Utc::now()).await.unwrap_err();

        assert!(matches!(err, DynamodbError::Storage(e) if e.is_unavailable()));
    }

    #[test]
    fn test_smoke_document_shape() {
        let doc = smoke_document(Utc::now());
        assert_eq!(doc["message_count"], json!(1));
        assert_eq!(doc["contacts"], json!({}));
        assert!(doc["last_activity"].as_str().unwrap().ends_with("+00:00"));
    }
}
