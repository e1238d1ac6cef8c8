//! Capability discovery.
//!
//! A [`CapabilityDescriptor`] names a logical tool together with the ordered
//! locations and operation aliases it may be found under. The [`resolve`]
//! function probes those candidates through a [`ModuleLoader`] and either
//! binds a callable operation or returns a report of every failed probe.

pub mod catalog;
mod descriptor;
mod error;
mod loader;
mod resolver;
mod search;

pub use descriptor::CapabilityDescriptor;
pub use error::{CapabilityError, LoadError, ToolError};
pub use loader::{
    FnOperation, Member, Module, ModuleLoader, Operation, ServiceHandle, StaticLoader, StaticModule,
};
pub use resolver::{
    resolve, ProbeAttempt, ProbeFailure, ResolutionReport, ResolutionState, ResolvedCapability,
};
pub use search::{
    escape_query_literal, narrowing_search, FileEntry, FileSearch, SearchOutcome, SearchStage,
};
