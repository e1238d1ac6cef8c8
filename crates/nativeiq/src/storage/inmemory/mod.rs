//! In-memory storage backend.
//!
//! Stores all records in a `BTreeMap` wrapped in `Arc<RwLock<_>>`, ordered by
//! `(user_id, session_id)` like the DynamoDB table. Useful for tests and
//! development where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use nativeiq::storage::inmemory::InMemorySessionStore;
//!
//! let store = InMemorySessionStore::new();
//! // Use store for testing...
//! ```

mod repository;

pub use repository::InMemorySessionStore;
