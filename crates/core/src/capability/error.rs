use thiserror::Error;

use super::ResolutionReport;

/// Errors raised by a [`ModuleLoader`](super::ModuleLoader).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("No module registered at {location}")]
    NotFound { location: String },
    #[error("Failed to load {location}: {reason}")]
    Failed { location: String, reason: String },
}

/// Errors raised by tool operations and backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Service not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("Tool backend failed: {0}")]
    Backend(String),
}

/// Errors returned by capability resolution.
#[derive(Debug, Error, Clone)]
pub enum CapabilityError {
    #[error("Capability '{}' unavailable after {} failed probe(s)", .0.capability, .0.attempts.len())]
    Unavailable(ResolutionReport),
    #[error("Capability '{capability}' not authenticated: service '{service}' at {location} is not initialized")]
    NotAuthenticated {
        capability: String,
        location: String,
        service: String,
        report: ResolutionReport,
    },
}

impl CapabilityError {
    /// The probe report collected before resolution stopped.
    pub fn report(&self) -> &ResolutionReport {
        match self {
            Self::Unavailable(report) => report,
            Self::NotAuthenticated { report, .. } => report,
        }
    }
}
