//! Ordered, deterministic capability resolution.
//!
//! One call walks `UNSTARTED → LOCATING → {LOCATED, LOCATION_FAILED} →
//! {OPERATION_FOUND, OPERATION_MISSING} → {READY, UNAVAILABLE}`, re-entering
//! `LOCATING` for every further candidate location. Resolution only reads
//! from the loader, so it can be repeated at will (for instance after
//! credentials are installed).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::{
    CapabilityDescriptor, CapabilityError, LoadError, Member, Module, ModuleLoader, Operation,
    ServiceHandle, ToolError,
};

/// States of a single resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unstarted,
    Locating,
    Located,
    LocationFailed,
    OperationFound,
    OperationMissing,
    Ready,
    Unavailable,
}

/// Why a single probe failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The location could not be loaded.
    LoadFailed(LoadError),
    /// The location has no member with the operation's name.
    MemberNotFound,
    /// The member exists but cannot be invoked.
    NotInvokable,
    /// A required service member is absent (or is not a service).
    RequiredServiceMissing { service: String },
    /// A required service member is present but uninitialized.
    NotAuthenticated { service: String },
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(err) => write!(f, "load failed: {err}"),
            Self::MemberNotFound => write!(f, "attribute not found"),
            Self::NotInvokable => write!(f, "not invokable"),
            Self::RequiredServiceMissing { service } => {
                write!(f, "required service '{service}' missing")
            }
            Self::NotAuthenticated { service } => {
                write!(f, "service '{service}' not authenticated")
            }
        }
    }
}

/// One failed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub location: String,
    /// `None` when the failure concerns the location as a whole.
    pub operation: Option<String>,
    pub failure: ProbeFailure,
}

/// Everything a resolution attempt tried, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    pub capability: String,
    pub attempts: Vec<ProbeAttempt>,
    pub trail: Vec<ResolutionState>,
    /// Members of each location that loaded but could not serve the
    /// capability.
    pub members: BTreeMap<String, Vec<String>>,
}

impl ResolutionReport {
    /// The last state reached.
    pub fn state(&self) -> ResolutionState {
        self.trail
            .last()
            .copied()
            .unwrap_or(ResolutionState::Unstarted)
    }

    /// One line per failed probe, then the members of every location that
    /// loaded without serving the capability.
    pub fn describe(&self) -> Vec<String> {
        let probes = self.attempts.iter().map(|attempt| match &attempt.operation {
            Some(op) => format!("{}.{}: {}", attempt.location, op, attempt.failure),
            None => format!("{}: {}", attempt.location, attempt.failure),
        });
        let members = self.members.iter().map(|(location, names)| {
            if names.is_empty() {
                format!("{location}: no members")
            } else {
                format!("{location}: available members: {}", names.join(", "))
            }
        });
        probes.chain(members).collect()
    }
}

/// A capability bound to a concrete, invokable operation.
#[derive(Clone)]
pub struct ResolvedCapability {
    pub name: String,
    pub location: String,
    pub operation_name: String,
    operation: Arc<dyn Operation>,
    services: BTreeMap<String, ServiceHandle>,
    report: ResolutionReport,
}

impl ResolvedCapability {
    /// Invokes the bound operation.
    pub async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        self.operation.invoke(args).await
    }

    /// A required service, checked authenticated during resolution.
    pub fn service(&self, name: &str) -> Option<&ServiceHandle> {
        self.services.get(name)
    }

    /// Probes that failed before this binding was found.
    pub fn report(&self) -> &ResolutionReport {
        &self.report
    }
}

impl std::fmt::Debug for ResolvedCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCapability")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("operation_name", &self.operation_name)
            .field("services", &self.services)
            .finish()
    }
}

enum ServiceCheck {
    Ready(BTreeMap<String, ServiceHandle>),
    Missing(String),
    NotAuthenticated(String),
}

struct Resolution<'a> {
    descriptor: &'a CapabilityDescriptor,
    report: ResolutionReport,
}

impl<'a> Resolution<'a> {
    fn new(descriptor: &'a CapabilityDescriptor) -> Self {
        Self {
            descriptor,
            report: ResolutionReport {
                capability: descriptor.name.clone(),
                attempts: Vec::new(),
                trail: vec![ResolutionState::Unstarted],
                members: BTreeMap::new(),
            },
        }
    }

    fn enter(&mut self, state: ResolutionState) {
        tracing::debug!(
            capability = %self.descriptor.name,
            from = ?self.report.state(),
            to = ?state,
            "capability resolution transition"
        );
        self.report.trail.push(state);
    }

    fn fail(&mut self, location: &str, operation: Option<&str>, failure: ProbeFailure) {
        tracing::debug!(
            capability = %self.descriptor.name,
            location,
            operation,
            %failure,
            "capability probe failed"
        );
        self.report.attempts.push(ProbeAttempt {
            location: location.to_string(),
            operation: operation.map(str::to_string),
            failure,
        });
    }

    fn record_members(&mut self, location: &str, module: &dyn Module) {
        let names = module.member_names();
        tracing::debug!(
            capability = %self.descriptor.name,
            location,
            members = ?names,
            "location cannot serve capability"
        );
        self.report.members.insert(location.to_string(), names);
    }

    /// First candidate operation on `module` that exists and is invokable.
    fn find_operation(
        &mut self,
        location: &str,
        module: &dyn Module,
    ) -> Option<(String, Arc<dyn Operation>)> {
        let descriptor = self.descriptor;
        for name in &descriptor.candidate_operations {
            match module.member(name) {
                Some(Member::Operation(op)) => return Some((name.clone(), op)),
                Some(_) => self.fail(location, Some(name), ProbeFailure::NotInvokable),
                None => self.fail(location, Some(name), ProbeFailure::MemberNotFound),
            }
        }
        None
    }

    fn check_services(&self, module: &dyn Module) -> ServiceCheck {
        let mut services = BTreeMap::new();
        for name in &self.descriptor.required_services {
            match module.member(name) {
                Some(Member::Service(handle)) if handle.is_authenticated() => {
                    services.insert(name.clone(), handle);
                }
                Some(Member::Service(_)) => return ServiceCheck::NotAuthenticated(name.clone()),
                _ => return ServiceCheck::Missing(name.clone()),
            }
        }
        ServiceCheck::Ready(services)
    }

    fn run(mut self, loader: &dyn ModuleLoader) -> Result<ResolvedCapability, CapabilityError> {
        let descriptor = self.descriptor;
        for location in &descriptor.candidate_locations {
            self.enter(ResolutionState::Locating);

            let module = match loader.load(location) {
                Ok(module) => module,
                Err(err) => {
                    self.fail(location, None, ProbeFailure::LoadFailed(err));
                    self.enter(ResolutionState::LocationFailed);
                    continue;
                }
            };
            self.enter(ResolutionState::Located);

            let Some((operation_name, operation)) = self.find_operation(location, module.as_ref())
            else {
                self.record_members(location, module.as_ref());
                self.enter(ResolutionState::OperationMissing);
                continue;
            };
            self.enter(ResolutionState::OperationFound);

            match self.check_services(module.as_ref()) {
                ServiceCheck::Ready(services) => {
                    self.enter(ResolutionState::Ready);
                    tracing::debug!(
                        capability = %self.descriptor.name,
                        location = %location,
                        operation = %operation_name,
                        "capability resolved"
                    );
                    return Ok(ResolvedCapability {
                        name: self.descriptor.name.clone(),
                        location: location.clone(),
                        operation_name,
                        operation,
                        services,
                        report: self.report,
                    });
                }
                ServiceCheck::Missing(service) => {
                    self.fail(
                        location,
                        Some(&operation_name),
                        ProbeFailure::RequiredServiceMissing { service },
                    );
                    self.record_members(location, module.as_ref());
                    self.enter(ResolutionState::OperationMissing);
                    continue;
                }
                ServiceCheck::NotAuthenticated(service) => {
                    self.fail(
                        location,
                        Some(&operation_name),
                        ProbeFailure::NotAuthenticated {
                            service: service.clone(),
                        },
                    );
                    self.enter(ResolutionState::Unavailable);
                    return Err(CapabilityError::NotAuthenticated {
                        capability: self.descriptor.name.clone(),
                        location: location.clone(),
                        service,
                        report: self.report,
                    });
                }
            }
        }

        self.enter(ResolutionState::Unavailable);
        Err(CapabilityError::Unavailable(self.report))
    }
}

/// Resolves `descriptor` against `loader`.
///
/// Locations are probed in order. On each location that loads, operation
/// names are probed in order; the first invokable one wins, provided the
/// location also exposes every required service. A location lacking a
/// required service is skipped. A required service that is present but
/// unauthenticated stops resolution with [`CapabilityError::NotAuthenticated`].
pub fn resolve(
    descriptor: &CapabilityDescriptor,
    loader: &dyn ModuleLoader,
) -> Result<ResolvedCapability, CapabilityError> {
    Resolution::new(descriptor).run(loader)
}
