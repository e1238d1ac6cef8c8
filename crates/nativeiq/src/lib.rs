//! Session persistence and tool availability for Native IQ.
//!
//! Backends for [`nativeiq_core::storage::SessionRepository`] live in
//! [`storage`]; [`tools`] checks which built-in capabilities are usable.

pub mod activity;
pub mod config;
pub mod storage;
pub mod tools;

pub use config::Config;
