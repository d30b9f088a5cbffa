//! Route registry
//!
//! Immutable once scanning completes; lookups from concurrent requests only
//! need shared references.

use crate::binding::Arg;
use crate::descriptor::RouteDescriptor;
use crate::encoder::Reply;
use crate::handler::{Call, Invoker};
use crate::{Error, Method, Result};
use sluice_router::RouteTable;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A registered handler
#[derive(Clone)]
pub struct Route {
    pub descriptor: RouteDescriptor,
    invoker: Invoker,
}

impl Route {
    pub fn new(descriptor: RouteDescriptor, invoker: Invoker) -> Self {
        Self {
            descriptor,
            invoker,
        }
    }

    /// Convert bound arguments into the handler's parameter types.
    ///
    /// No controller is constructed until the returned call is invoked.
    pub fn prepare(&self, args: Vec<Arg>) -> Result<Call> {
        (self.invoker)(args)
    }

    /// Create a fresh controller and run the handler.
    ///
    /// A panic inside the handler is reported as [`Error::Invocation`].
    pub fn invoke(&self, call: Call) -> Result<Box<dyn Reply>> {
        match catch_unwind(AssertUnwindSafe(call)) {
            Ok(result) => result,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                Err(Error::Invocation(format!(
                    "{}::{} panicked: {msg}",
                    self.descriptor.owner(),
                    self.descriptor.method_name()
                )))
            }
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Routes keyed by (verb, path)
#[derive(Debug, Default)]
pub struct RouteRegistry {
    table: RouteTable<Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route; an existing (verb, path) key is a conflict
    pub fn register(&mut self, method: Method, path: &str, route: Route) -> Result<()> {
        self.table.insert(method.as_str(), path, route)?;
        Ok(())
    }

    /// Find the route for a request key
    pub fn lookup(&self, method: Method, path: &str) -> Result<&Route> {
        self.table
            .find(method.as_str(), path)
            .ok_or_else(|| Error::RouteNotFound {
                method: method.as_str().to_string(),
                path: path.to_string(),
            })
    }

    /// All routes as (verb, path, route)
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &Route)> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
