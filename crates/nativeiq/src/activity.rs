//! Per-turn bookkeeping on the session document.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use nativeiq_core::session::{timestamp, SessionData, SessionKey};
use nativeiq_core::storage::{Result, SessionRepository};

pub const LAST_ACTIVITY: &str = "last_activity";
pub const MESSAGE_COUNT: &str = "message_count";
pub const CONTACTS: &str = "contacts";

/// Records one interaction on the session at `key` and returns the stored
/// document.
///
/// Starts an empty document when the session does not exist yet. This is a
/// read-modify-write: concurrent turns on the same key are last-write-wins.
pub async fn record_activity(
    repo: &dyn SessionRepository,
    key: &SessionKey,
    now: DateTime<Utc>,
) -> Result<SessionData> {
    let mut data = repo
        .get(key)
        .await?
        .map(|record| record.session_data)
        .unwrap_or_default();

    touch(&mut data, now);
    repo.put(key, data.clone()).await?;

    tracing::debug!(%key, message_count = ?data.get(MESSAGE_COUNT), "session activity recorded");
    Ok(data)
}

/// Applies the activity fields to a document.
///
/// A `message_count` that is missing or not a non-negative integer restarts
/// at 1. A `contacts` value that is not an object is left untouched.
pub fn touch(data: &mut SessionData, now: DateTime<Utc>) {
    data.insert(
        LAST_ACTIVITY.to_string(),
        Value::String(timestamp::format(&now)),
    );

    let count = data
        .get(MESSAGE_COUNT)
        .and_then(Value::as_u64)
        .map_or(1, |n| n.saturating_add(1));
    data.insert(MESSAGE_COUNT.to_string(), Value::from(count));

    data.entry(CONTACTS.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 19, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_first_activity_starts_document() {
        let store = InMemorySessionStore::new();
        let key = SessionKey::new("test_user_123", "test_session_456").unwrap();

        let data = record_activity(&store, &key, at(9)).await.unwrap();

        assert_eq!(
            serde_json::Value::Object(data),
            json!({
                "contacts": {},
                "last_activity": "2025-08-19T09:00:00.000000+00:00",
                "message_count": 1
            })
        );
        assert!(store.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_activity_increments_and_keeps_other_fields() {
        let store = InMemorySessionStore::new();
        let key = SessionKey::new("u", "s").unwrap();
        let initial = json!({
            "contacts": {"alice": "alice@example.com"},
            "message_count": 4,
            "draft": "hello"
        });
        store
            .put(&key, initial.as_object().cloned().unwrap())
            .await
            .unwrap();

        record_activity(&store, &key, at(10)).await.unwrap();

        let stored = store.get(&key).await.unwrap().unwrap().session_data;
        assert_eq!(stored[MESSAGE_COUNT], json!(5));
        assert_eq!(stored[CONTACTS], json!({"alice": "alice@example.com"}));
        assert_eq!(stored["draft"], json!("hello"));
        assert_eq!(
            stored[LAST_ACTIVITY],
            json!("2025-08-19T10:00:00.000000+00:00")
        );
    }

    #[test]
    fn test_touch_resets_garbage_count() {
        let mut data = json!({"message_count": "many"})
            .as_object()
            .cloned()
            .unwrap();

        touch(&mut data, at(9));

        assert_eq!(data[MESSAGE_COUNT], json!(1));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_propagated() {
        let store = InMemorySessionStore::new();
        store.set_outage(Some(nativeiq_core::storage::UnavailableKind::Connectivity));

        let err = record_activity(&store, &SessionKey::new("u", "s").unwrap(), at(9))
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
    }
}
