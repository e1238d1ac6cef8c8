//! Error types for DynamoDB tasks.

use nativeiq_core::storage::{ProvisionError, StorageError};
use thiserror::Error;

/// Result type alias for dynamodb module.
pub type Result<T> = std::result::Result<T, DynamodbError>;

/// Errors that can occur during DynamoDB tasks.
#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Table '{table_name}' not found, run `cargo xtask dynamodb provision` first")]
    TableNotFound { table_name: String },

    #[error("Smoke test failed at {step}: {reason}")]
    SmokeTest { step: &'static str, reason: String },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Prompt failed: {0}")]
    Prompt(String),
}
