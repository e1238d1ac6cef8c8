//! The seam between the resolver and whatever hosts the tools.
//!
//! A [`ModuleLoader`] turns a location string into a [`Module`]; a module
//! exposes named [`Member`]s. [`StaticLoader`] is an in-process registry
//! that hosts populate at startup.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{LoadError, ToolError};

/// An invokable tool operation.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

/// Adapts a synchronous closure into an [`Operation`].
pub struct FnOperation<F>(F);

impl<F> FnOperation<F>
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    /// Wraps the closure, ready to register on a [`StaticModule`].
    pub fn shared(f: F) -> Arc<dyn Operation> {
        Arc::new(Self(f))
    }
}

#[async_trait]
impl<F> Operation for FnOperation<F>
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        (self.0)(args)
    }
}

/// A service dependency a tool needs before it can run.
///
/// An unauthenticated handle is an explicit state, not a missing member.
#[derive(Clone, Default)]
pub struct ServiceHandle(Option<Arc<dyn Any + Send + Sync>>);

impl ServiceHandle {
    /// A handle backed by a ready-to-use service.
    pub fn authenticated<T: Any + Send + Sync>(service: T) -> Self {
        Self(Some(Arc::new(service)))
    }

    /// A handle whose service has not been initialized.
    pub fn unauthenticated() -> Self {
        Self(None)
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// Borrows the service as `T`, if authenticated and of that type.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|service| service.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_authenticated() {
            write!(f, "ServiceHandle(authenticated)")
        } else {
            write!(f, "ServiceHandle(unauthenticated)")
        }
    }
}

/// A named member of a loaded module.
#[derive(Clone)]
pub enum Member {
    /// Something that can be invoked.
    Operation(Arc<dyn Operation>),
    /// Present but not invokable (a constant, a type, a stale alias).
    Value,
    /// A service dependency.
    Service(ServiceHandle),
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operation(_) => write!(f, "Operation"),
            Self::Value => write!(f, "Value"),
            Self::Service(handle) => write!(f, "Service({handle:?})"),
        }
    }
}

/// A loaded location.
pub trait Module: Send + Sync {
    /// Looks up a member by name.
    fn member(&self, name: &str) -> Option<Member>;

    /// Names of every member, for diagnostics.
    fn member_names(&self) -> Vec<String>;
}

/// Loads modules by location.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, location: &str) -> Result<Arc<dyn Module>, LoadError>;
}

/// A module assembled in-process.
#[derive(Debug, Clone, Default)]
pub struct StaticModule {
    members: BTreeMap<String, Member>,
}

impl StaticModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, name: impl Into<String>, operation: Arc<dyn Operation>) -> Self {
        self.members
            .insert(name.into(), Member::Operation(operation));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into(), Member::Value);
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, handle: ServiceHandle) -> Self {
        self.members.insert(name.into(), Member::Service(handle));
        self
    }
}

impl Module for StaticModule {
    fn member(&self, name: &str) -> Option<Member> {
        self.members.get(name).cloned()
    }

    fn member_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }
}

enum Registration {
    Loaded(Arc<dyn Module>),
    Broken(String),
}

/// In-process registry of modules keyed by location.
///
/// Locations that are known but cannot load (a legacy path whose
/// dependencies are gone, say) are registered with a failure reason so
/// probes report a load failure instead of "not found".
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<String, Registration>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module at `location`, replacing any previous registration.
    pub fn register(&mut self, location: impl Into<String>, module: impl Module + 'static) {
        self.modules
            .insert(location.into(), Registration::Loaded(Arc::new(module)));
    }

    /// Registers `location` as present but failing to load.
    pub fn register_failure(&mut self, location: impl Into<String>, reason: impl Into<String>) {
        self.modules
            .insert(location.into(), Registration::Broken(reason.into()));
    }

    pub fn with_module(mut self, location: impl Into<String>, module: impl Module + 'static) -> Self {
        self.register(location, module);
        self
    }

    pub fn with_failure(mut self, location: impl Into<String>, reason: impl Into<String>) -> Self {
        self.register_failure(location, reason);
        self
    }
}

impl ModuleLoader for StaticLoader {
    fn load(&self, location: &str) -> Result<Arc<dyn Module>, LoadError> {
        match self.modules.get(location) {
            Some(Registration::Loaded(module)) => Ok(Arc::clone(module)),
            Some(Registration::Broken(reason)) => Err(LoadError::Failed {
                location: location.to_string(),
                reason: reason.clone(),
            }),
            None => Err(LoadError::NotFound {
                location: location.to_string(),
            }),
        }
    }
}
