//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! session records. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use nativeiq_core::session::{timestamp, SessionData, SessionKey, SessionRecord};
use nativeiq_core::storage::StorageError;
use serde_json::{Number, Value};

// ============================================================================
// Attribute names
// ============================================================================

pub const USER_ID: &str = "user_id";
pub const SESSION_ID: &str = "session_id";
pub const SESSION_DATA: &str = "session_data";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Update expression used by `put`: replaces the document, refreshes
/// `updated_at` and only sets `created_at` when the item is new.
pub const UPSERT_EXPRESSION: &str = "SET #data = :data, #updated = :now, \
     #created = if_not_exists(#created, :now)";

// ============================================================================
// Key conversions
// ============================================================================

/// Build the primary key of a session item.
pub fn key_attributes(key: &SessionKey) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            USER_ID.to_string(),
            AttributeValue::S(key.user_id().to_string()),
        ),
        (
            SESSION_ID.to_string(),
            AttributeValue::S(key.session_id().to_string()),
        ),
    ])
}

// ============================================================================
// Record conversions
// ============================================================================

/// Convert a DynamoDB item to SessionRecord.
pub fn item_to_record(
    item: &HashMap<String, AttributeValue>,
) -> Result<SessionRecord, StorageError> {
    let key = SessionKey::new(get_string(item, USER_ID)?, get_string(item, SESSION_ID)?)?;

    let session_data = match item.get(SESSION_DATA) {
        Some(AttributeValue::M(map)) => map_to_object(map)?,
        Some(_) => {
            return Err(StorageError::InvalidData(format!(
                "Field {SESSION_DATA} is not a map"
            )))
        }
        None => {
            return Err(StorageError::InvalidData(format!(
                "Missing or invalid field: {SESSION_DATA}"
            )))
        }
    };

    let created_at = get_datetime(item, CREATED_AT)?;
    // A writer with a lagging clock can store an older updated_at.
    let updated_at = get_datetime(item, UPDATED_AT)?.max(created_at);

    Ok(SessionRecord {
        key,
        session_data,
        created_at,
        updated_at,
    })
}

/// Convert a session document to a DynamoDB map attribute.
pub fn session_data_to_attribute(data: &SessionData) -> AttributeValue {
    AttributeValue::M(
        data.iter()
            .map(|(k, v)| (k.clone(), json_to_attribute(v)))
            .collect(),
    )
}

// ============================================================================
// JSON <-> AttributeValue
// ============================================================================

/// Convert a JSON value to an AttributeValue.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert an AttributeValue back to JSON.
///
/// String and number sets come back as arrays. Binary attributes are never
/// written by this store and are rejected.
pub fn attribute_to_json(value: &AttributeValue) -> Result<Value, StorageError> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(items) => items
            .iter()
            .map(attribute_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => map_to_object(map).map(Value::Object),
        AttributeValue::Ss(items) => Ok(Value::Array(
            items.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(items) => items
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(StorageError::InvalidData(format!(
            "Unsupported attribute type in session data: {:?}",
            other
        ))),
    }
}

fn map_to_object(map: &HashMap<String, AttributeValue>) -> Result<SessionData, StorageError> {
    map.iter()
        .map(|(k, v)| attribute_to_json(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Parse a DynamoDB number, preferring integers so they round-trip exactly.
fn parse_number(s: &str) -> Result<Number, StorageError> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Ok(Number::from(u));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StorageError::InvalidData(format!("Invalid number: {}", s)))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, StorageError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| StorageError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, StorageError> {
    let s = get_string(item, key)?;
    timestamp::parse(&s)
        .map_err(|e| StorageError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> HashMap<String, AttributeValue> {
        let data = json!({
            "contacts": {},
            "last_activity": "2025-08-19T16:54:56+05:30",
            "message_count": 1
        });
        let mut item = key_attributes(&SessionKey::new("test_user_123", "test_session_456").unwrap());
        item.insert(
            SESSION_DATA.to_string(),
            session_data_to_attribute(data.as_object().unwrap()),
        );
        item.insert(
            CREATED_AT.to_string(),
            AttributeValue::S("2025-08-19T16:54:56+05:30".to_string()),
        );
        item.insert(
            UPDATED_AT.to_string(),
            AttributeValue::S("2025-08-19T11:30:00.000000+00:00".to_string()),
        );
        item
    }

    #[test]
    fn test_key_attributes() {
        let item = key_attributes(&SessionKey::new("u-1", "s-1").unwrap());

        assert_eq!(item.len(), 2);
        assert_eq!(item.get(USER_ID).unwrap().as_s().unwrap(), "u-1");
        assert_eq!(item.get(SESSION_ID).unwrap().as_s().unwrap(), "s-1");
    }

    #[test]
    fn test_item_to_record() {
        let record = item_to_record(&sample_item()).unwrap();

        assert_eq!(record.key.user_id(), "test_user_123");
        assert_eq!(record.key.session_id(), "test_session_456");
        assert_eq!(record.session_data["message_count"], json!(1));
        assert_eq!(record.session_data["contacts"], json!({}));
        assert_eq!(
            timestamp::format(&record.created_at),
            "2025-08-19T11:24:56.000000+00:00"
        );
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let mut item = sample_item();
        item.insert(
            UPDATED_AT.to_string(),
            AttributeValue::S("2025-08-19T11:00:00+00:00".to_string()),
        );

        let record = item_to_record(&item).unwrap();
        assert_eq!(record.updated_at, record.created_at);
    }

    #[test]
    fn test_item_without_session_data_is_invalid() {
        let mut item = sample_item();
        item.remove(SESSION_DATA);

        let err = item_to_record(&item).unwrap_err();
        assert_eq!(
            err,
            StorageError::InvalidData("Missing or invalid field: session_data".to_string())
        );
    }

    #[test]
    fn test_item_with_bad_timestamp_is_invalid() {
        let mut item = sample_item();
        item.insert(CREATED_AT.to_string(), AttributeValue::S("yesterday".to_string()));

        assert!(matches!(
            item_to_record(&item),
            Err(StorageError::InvalidData(msg)) if msg.starts_with("Invalid datetime created_at")
        ));
    }

    #[test]
    fn test_nested_values_map_to_native_attributes() {
        let attr = json_to_attribute(&json!({
            "tags": ["a", "b"],
            "flag": false,
            "none": null,
            "ratio": 0.25
        }));

        let map = attr.as_m().unwrap();
        assert_eq!(
            map.get("tags").unwrap().as_l().unwrap(),
            &vec![
                AttributeValue::S("a".to_string()),
                AttributeValue::S("b".to_string())
            ]
        );
        assert_eq!(map.get("flag").unwrap(), &AttributeValue::Bool(false));
        assert_eq!(map.get("none").unwrap(), &AttributeValue::Null(true));
        assert_eq!(map.get("ratio").unwrap(), &AttributeValue::N("0.25".to_string()));
    }

    #[test]
    fn test_numbers_keep_integer_type() {
        assert_eq!(
            attribute_to_json(&AttributeValue::N("42".to_string())).unwrap(),
            json!(42)
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::N("18446744073709551615".to_string())).unwrap(),
            json!(u64::MAX)
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::N("1.5".to_string())).unwrap(),
            json!(1.5)
        );
        assert!(attribute_to_json(&AttributeValue::N("abc".to_string())).is_err());
    }

    #[test]
    fn test_trimmed_numbers_match_normalized_document() {
        let mut written = json!({"score": 2.0, "history": [10.0, 2.5]})
            .as_object()
            .cloned()
            .unwrap();
        nativeiq_core::session::number::normalize(&mut written);

        // DynamoDB drops trailing zeros from stored numbers.
        let stored = AttributeValue::M(HashMap::from([
            ("score".to_string(), AttributeValue::N("2".to_string())),
            (
                "history".to_string(),
                AttributeValue::L(vec![
                    AttributeValue::N("10".to_string()),
                    AttributeValue::N("2.5".to_string()),
                ]),
            ),
        ]));

        assert_eq!(session_data_to_attribute(&written), stored);
        assert_eq!(attribute_to_json(&stored).unwrap(), Value::Object(written));
    }

    #[test]
    fn test_sets_come_back_as_arrays() {
        let ss = AttributeValue::Ss(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(attribute_to_json(&ss).unwrap(), json!(["x", "y"]));
    }

    #[test]
    fn test_empty_document_is_an_empty_map() {
        let attr = session_data_to_attribute(&SessionData::new());
        assert!(attr.as_m().unwrap().is_empty());
    }
}
