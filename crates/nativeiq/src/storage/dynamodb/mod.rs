//! DynamoDB storage backend implementation.
//!
//! Sessions live in a single table keyed by `user_id` (partition) and
//! `session_id` (sort), billed on demand. See [`table`] for the schema and
//! [`planning`] for how provisioning decides what to do.

mod conversions;
mod error;
pub mod planning;
mod repository;
pub mod table;

pub use repository::DynamoDbSessionStore;
pub use table::{session_table_config, TableConfig};
