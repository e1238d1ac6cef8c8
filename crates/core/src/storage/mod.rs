mod error;
mod traits;

pub use error::{ProvisionError, Result, StorageError, UnavailableKind};
pub use traits::{ProvisionOutcome, SessionRepository};
