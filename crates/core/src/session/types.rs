use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionKeyError;

/// Application-defined session document.
///
/// The store imposes no schema beyond the top-level object.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Composite key of a session: `user_id` partitions, `session_id` sorts.
///
/// Ordering follows the table layout, so a sorted collection of keys groups
/// every session of a user together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSessionKey")]
pub struct SessionKey {
    user_id: String,
    session_id: String,
}

#[derive(Deserialize)]
struct RawSessionKey {
    user_id: String,
    session_id: String,
}

impl TryFrom<RawSessionKey> for SessionKey {
    type Error = SessionKeyError;

    fn try_from(raw: RawSessionKey) -> Result<Self, Self::Error> {
        Self::new(raw.user_id, raw.session_id)
    }
}

impl SessionKey {
    /// Creates a key, rejecting empty parts.
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, SessionKeyError> {
        let user_id = user_id.into();
        let session_id = session_id.into();

        if user_id.is_empty() {
            return Err(SessionKeyError::EmptyUserId);
        }
        if session_id.is_empty() {
            return Err(SessionKeyError::EmptySessionId);
        }

        Ok(Self {
            user_id,
            session_id,
        })
    }

    /// Creates a key for a brand new session of `user_id`.
    pub fn generate(user_id: impl Into<String>) -> Result<Self, SessionKeyError> {
        Self::new(user_id, Uuid::new_v4().to_string())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.session_id)
    }
}

/// A stored session.
///
/// `created_at` is fixed by the first write of the key. `updated_at` moves on
/// every write and never precedes `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub key: SessionKey,
    pub session_data: SessionData,
    #[serde(with = "super::timestamp::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp::rfc3339")]
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Creates the record produced by the first write of `key`.
    pub fn new(key: SessionKey, session_data: SessionData, now: DateTime<Utc>) -> Self {
        Self {
            key,
            session_data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the record produced by overwriting this one at `now`.
    ///
    /// `created_at` is carried over. `updated_at` never moves backwards, even
    /// if the writer's clock is behind the previous writer's.
    pub fn overwrite(&self, session_data: SessionData, now: DateTime<Utc>) -> Self {
        Self {
            key: self.key.clone(),
            session_data,
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 19, hour, 0, 0).unwrap()
    }

    fn data(value: serde_json::Value) -> SessionData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_key_rejects_empty_parts() {
        assert_eq!(
            SessionKey::new("", "s-1").unwrap_err(),
            SessionKeyError::EmptyUserId
        );
        assert_eq!(
            SessionKey::new("u-1", "").unwrap_err(),
            SessionKeyError::EmptySessionId
        );
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = SessionKey::generate("u-1").unwrap();
        let b = SessionKey::generate("u-1").unwrap();
        assert_eq!(a.user_id(), "u-1");
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_keys_sort_by_user_then_session() {
        let mut keys = vec![
            SessionKey::new("u-2", "a").unwrap(),
            SessionKey::new("u-1", "b").unwrap(),
            SessionKey::new("u-1", "a").unwrap(),
        ];
        keys.sort();
        let flat: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(flat, vec!["u-1/a", "u-1/b", "u-2/a"]);
    }

    #[test]
    fn test_overwrite_keeps_created_at() {
        let key = SessionKey::new("u-1", "s-1").unwrap();
        let first = SessionRecord::new(key, data(json!({"step": 1})), at(9));
        let second = first.overwrite(data(json!({"step": 2})), at(10));

        assert_eq!(second.created_at, at(9));
        assert_eq!(second.updated_at, at(10));
        assert_eq!(second.session_data, data(json!({"step": 2})));
    }

    #[test]
    fn test_overwrite_with_lagging_clock_does_not_rewind() {
        let key = SessionKey::new("u-1", "s-1").unwrap();
        let first = SessionRecord::new(key, SessionData::new(), at(9));
        let second = first.overwrite(SessionData::new(), at(9) - Duration::seconds(5));

        assert_eq!(second.updated_at, at(9));
        assert!(second.updated_at >= second.created_at);
    }

    #[test]
    fn test_record_serializes_flat_with_utc_offsets() {
        let key = SessionKey::new("test_user_123", "test_session_456").unwrap();
        let record = SessionRecord::new(key, data(json!({"message_count": 1})), at(11));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["user_id"], "test_user_123");
        assert_eq!(value["session_id"], "test_session_456");
        assert_eq!(value["created_at"], "2025-08-19T11:00:00.000000+00:00");

        let parsed: SessionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_deserialize_rejects_empty_key() {
        let value = json!({
            "user_id": "",
            "session_id": "s-1",
            "session_data": {},
            "created_at": "2025-08-19T11:00:00+00:00",
            "updated_at": "2025-08-19T11:00:00+00:00"
        });
        assert!(serde_json::from_value::<SessionRecord>(value).is_err());
    }
}
