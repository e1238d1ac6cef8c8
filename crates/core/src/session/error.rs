use thiserror::Error;

/// Errors that can occur when constructing a session key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionKeyError {
    #[error("Invalid session key: user_id must not be empty")]
    EmptyUserId,
    #[error("Invalid session key: session_id must not be empty")]
    EmptySessionId,
}
