use std::time::Duration;

use thiserror::Error;

use crate::session::SessionKeyError;

/// Why the backing store could not serve a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    /// The service could not be reached or the request timed out.
    Connectivity,
    /// Throughput or request limits were exceeded.
    Throttled,
    /// Credentials were missing, expired or rejected.
    Unauthorized,
    /// The table does not exist (not provisioned yet).
    MissingTable,
    /// Any other service-side failure.
    Service,
}

impl std::fmt::Display for UnavailableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connectivity => write!(f, "connectivity"),
            Self::Throttled => write!(f, "throttled"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::MissingTable => write!(f, "missing table"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Errors that can occur during session repository operations.
///
/// A missing session is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable ({kind}) during {operation}: {reason}")]
    Unavailable {
        kind: UnavailableKind,
        operation: &'static str,
        reason: String,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    InvalidKey(#[from] SessionKeyError),
}

impl StorageError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(
        kind: UnavailableKind,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Unavailable {
            kind,
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true when the backing store could not serve the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors that can occur while provisioning the session table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Timed out after {waited:?} waiting for table '{table_name}' to become active")]
    Timeout { table_name: String, waited: Duration },
    #[error("Table '{table_name}' has an incompatible key schema: expected {expected}, found {found}")]
    SchemaMismatch {
        table_name: String,
        expected: String,
        found: String,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let error = StorageError::unavailable(
            UnavailableKind::Throttled,
            "GetItem",
            "Throughput exceeded, please retry",
        );
        assert_eq!(
            error.to_string(),
            "Storage unavailable (throttled) during GetItem: Throughput exceeded, please retry"
        );
        assert!(error.is_unavailable());
    }

    #[test]
    fn test_invalid_data_is_not_unavailable() {
        let error = StorageError::InvalidData("Missing or invalid field: created_at".to_string());
        assert!(!error.is_unavailable());
        assert_eq!(
            error.to_string(),
            "Invalid data: Missing or invalid field: created_at"
        );
    }

    #[test]
    fn test_invalid_key_is_transparent() {
        let error: StorageError = SessionKeyError::EmptyUserId.into();
        assert_eq!(
            error.to_string(),
            "Invalid session key: user_id must not be empty"
        );
    }

    #[test]
    fn test_provision_timeout_display() {
        let error = ProvisionError::Timeout {
            table_name: "native_iq_sessions".to_string(),
            waited: Duration::from_secs(30),
        };
        assert_eq!(
            error.to_string(),
            "Timed out after 30s waiting for table 'native_iq_sessions' to become active"
        );
    }

    #[test]
    fn test_provision_schema_mismatch_display() {
        let error = ProvisionError::SchemaMismatch {
            table_name: "native_iq_sessions".to_string(),
            expected: "user_id (HASH, S), session_id (RANGE, S)".to_string(),
            found: "PK (HASH, S)".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Table 'native_iq_sessions' has an incompatible key schema: \
             expected user_id (HASH, S), session_id (RANGE, S), found PK (HASH, S)"
        );
    }
}
