//! Storage backend implementations.
//!
//! This module provides concrete implementations of
//! `nativeiq_core::storage::SessionRepository`, selected via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local store for tests and development
//! - `dynamodb`: AWS DynamoDB store using `aws-sdk-dynamodb`
//!
//! Both backends may be compiled in at the same time.
//!
//! # Examples
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p nativeiq --features dynamodb
//! ```

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemorySessionStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbSessionStore;
