//! Availability checks for the built-in tools.

use std::sync::Arc;

use nativeiq_core::capability::catalog::{self, DRIVE_SERVICE};
use nativeiq_core::capability::{
    narrowing_search, resolve, CapabilityDescriptor, CapabilityError, FileSearch, ModuleLoader,
    ResolvedCapability, SearchOutcome, ToolError,
};

/// Whether a tool can be used right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Ready {
        location: String,
        operation: String,
    },
    /// The tool was found but its service has no credentials yet.
    NotAuthenticated { location: String, service: String },
    /// Nothing usable was found; one line per failed probe.
    Unavailable { attempts: Vec<String> },
}

/// Availability of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAvailability {
    pub name: String,
    pub status: ToolStatus,
}

impl ToolAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self.status, ToolStatus::Ready { .. })
    }
}

/// Resolves every built-in tool against `loader`.
pub fn check_tools(loader: &dyn ModuleLoader) -> Vec<ToolAvailability> {
    check_descriptors(loader, &catalog::builtin())
}

/// Resolves each descriptor against `loader`, logging the outcome.
pub fn check_descriptors(
    loader: &dyn ModuleLoader,
    descriptors: &[CapabilityDescriptor],
) -> Vec<ToolAvailability> {
    descriptors
        .iter()
        .map(|descriptor| {
            let status = match resolve(descriptor, loader) {
                Ok(resolved) => {
                    tracing::info!(
                        tool = %descriptor.name,
                        location = %resolved.location,
                        operation = %resolved.operation_name,
                        "tool ready"
                    );
                    ToolStatus::Ready {
                        location: resolved.location,
                        operation: resolved.operation_name,
                    }
                }
                Err(CapabilityError::NotAuthenticated {
                    location, service, ..
                }) => {
                    tracing::warn!(tool = %descriptor.name, %location, %service, "tool not authenticated");
                    ToolStatus::NotAuthenticated { location, service }
                }
                Err(err @ CapabilityError::Unavailable(_)) => {
                    let attempts = err.report().describe();
                    tracing::warn!(tool = %descriptor.name, ?attempts, "tool unavailable");
                    ToolStatus::Unavailable { attempts }
                }
            };

            ToolAvailability {
                name: descriptor.name.clone(),
                status,
            }
        })
        .collect()
}

/// Searches the drive behind a resolved drive capability for `name`.
///
/// The drive service member must hold an `Arc<dyn FileSearch>`.
pub async fn find_drive_file(
    drive: &ResolvedCapability,
    name: &str,
) -> Result<SearchOutcome, ToolError> {
    let service = drive
        .service(DRIVE_SERVICE)
        .and_then(|handle| handle.get::<Arc<dyn FileSearch>>())
        .ok_or_else(|| {
            ToolError::NotAuthenticated(format!("{} has no usable {}", drive.name, DRIVE_SERVICE))
        })?;

    let outcome = narrowing_search(service.as_ref(), name).await?;
    tracing::info!(
        file = name,
        stage = ?outcome.stage,
        found = outcome.files.len(),
        "drive search finished"
    );
    Ok(outcome)
}
