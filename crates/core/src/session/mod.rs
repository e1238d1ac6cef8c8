//! Persisted session documents keyed by `(user_id, session_id)`.

mod error;
pub mod number;
pub mod timestamp;
mod types;

pub use error::SessionKeyError;
pub use types::{SessionData, SessionKey, SessionRecord};
