//! Core types for Native IQ.
//!
//! - [`session`]: the persisted per-user session document.
//! - [`storage`]: the repository abstraction over session persistence.
//! - [`capability`]: discovery and validation of pluggable tools.

pub mod capability;
pub mod session;
pub mod storage;
