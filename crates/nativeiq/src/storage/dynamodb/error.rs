//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StorageError` from `nativeiq_core::storage`.
//! Requests the service rejected as malformed become `InvalidData`; every
//! other failure becomes `Unavailable`. A missing item is reported by the
//! operation's output, never by an error.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use nativeiq_core::storage::{StorageError, UnavailableKind};

const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "Throttling",
];

const CREDENTIAL_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "AccessDeniedException",
    "ExpiredTokenException",
    "MissingAuthenticationToken",
    "IncompleteSignature",
    "InvalidClientTokenId",
];

/// Codes for requests DynamoDB refused to apply. Retrying will not help.
const REJECTED_CODES: &[&str] = &[
    "ValidationException",
    "ConditionalCheckFailedException",
    "ItemCollectionSizeLimitExceededException",
    "TransactionCanceledException",
];

/// Error code DynamoDB returns for an unknown table.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Classify a service error code.
pub fn classify_code(code: Option<&str>) -> UnavailableKind {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => UnavailableKind::Throttled,
        Some(code) if CREDENTIAL_CODES.contains(&code) => UnavailableKind::Unauthorized,
        Some(RESOURCE_NOT_FOUND) => UnavailableKind::MissingTable,
        _ => UnavailableKind::Service,
    }
}

/// Build the `StorageError` for a service error code.
pub fn error_for_code(code: Option<&str>, operation: &'static str, reason: String) -> StorageError {
    match code {
        Some(code) if REJECTED_CODES.contains(&code) => {
            StorageError::InvalidData(format!("{operation} rejected by DynamoDB: {reason}"))
        }
        _ => StorageError::unavailable(classify_code(code), operation, reason),
    }
}

/// Classify an SDK error without consuming it.
pub fn classify<E, R>(err: &SdkError<E, R>) -> UnavailableKind
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            UnavailableKind::Connectivity
        }
        SdkError::ServiceError(context) => classify_code(context.err().code()),
        _ => UnavailableKind::Service,
    }
}

/// Map any SDK error to a `StorageError`.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>, operation: &'static str) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug,
{
    let reason = DisplayErrorContext(&err).to_string();
    let error = match &err {
        SdkError::ServiceError(context) => error_for_code(context.err().code(), operation, reason),
        _ => StorageError::unavailable(classify(&err), operation, reason),
    };
    tracing::warn!(operation, error = %error, "DynamoDB request failed");
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttling_codes() {
        assert_eq!(
            classify_code(Some("ProvisionedThroughputExceededException")),
            UnavailableKind::Throttled
        );
        assert_eq!(
            classify_code(Some("RequestLimitExceeded")),
            UnavailableKind::Throttled
        );
        assert_eq!(
            classify_code(Some("ThrottlingException")),
            UnavailableKind::Throttled
        );
    }

    #[test]
    fn test_credential_codes() {
        assert_eq!(
            classify_code(Some("UnrecognizedClientException")),
            UnavailableKind::Unauthorized
        );
        assert_eq!(
            classify_code(Some("ExpiredTokenException")),
            UnavailableKind::Unauthorized
        );
        assert_eq!(
            classify_code(Some("AccessDeniedException")),
            UnavailableKind::Unauthorized
        );
    }

    #[test]
    fn test_missing_table_is_not_a_missing_item() {
        assert_eq!(
            classify_code(Some(RESOURCE_NOT_FOUND)),
            UnavailableKind::MissingTable
        );
    }

    #[test]
    fn test_unknown_codes_are_service_errors() {
        assert_eq!(
            classify_code(Some("InternalServerError")),
            UnavailableKind::Service
        );
        assert_eq!(classify_code(None), UnavailableKind::Service);
    }

    #[test]
    fn test_validation_errors_are_not_outages() {
        let err = error_for_code(
            Some("ValidationException"),
            "put",
            "Item size has exceeded the maximum allowed size".to_string(),
        );

        assert!(!err.is_unavailable());
        assert!(matches!(&err, StorageError::InvalidData(msg) if msg.contains("put rejected")));
    }

    #[test]
    fn test_conditional_failure_is_rejected_request() {
        let err = error_for_code(
            Some("ConditionalCheckFailedException"),
            "put",
            "The conditional request failed".to_string(),
        );
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn test_other_codes_stay_unavailable() {
        let err = error_for_code(Some("ThrottlingException"), "get", "slow down".to_string());
        assert!(matches!(
            err,
            StorageError::Unavailable {
                kind: UnavailableKind::Throttled,
                ..
            }
        ));
    }
}
