//! Request dispatch
//!
//! Each request runs through a fixed pipeline, failing fast at the first
//! stage that errors:
//!
//! ```text
//! lookup (verb, path) → shape check → argument binding → invocation → encoding
//! ```
//!
//! Binding includes the typed conversion of every argument, so a body that
//! does not decode fails before any controller is constructed.

use crate::binding;
use crate::config::AppConfig;
use crate::descriptor::RouteDescriptor;
use crate::discovery::Catalog;
use crate::encoder;
use crate::registry::RouteRegistry;
use crate::scanner::Scanner;
use crate::{Error, Method, Request, Response, Result};
use std::sync::Arc;
use tracing::{debug, error};

/// Routes requests to registered handlers
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
}

impl Dispatcher {
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Scan `catalog` for the configured entry point and build a dispatcher
    pub fn bootstrap(config: &AppConfig, catalog: &Catalog) -> Result<Self> {
        let registry = Scanner::new(catalog)
            .context_path(config.context_path.as_deref())
            .scan(config.entry_point.as_deref())?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Run the full pipeline for one request
    pub fn dispatch(&self, req: &Request) -> Result<Response> {
        let route = self.registry.lookup(req.method, &req.path)?;
        validate_shape(req.method, &req.path, &route.descriptor)?;

        let args = binding::bind(&route.descriptor, &req.query_map(), &req.body)?;
        let arity = args.len();
        let call = route.prepare(args)?;
        debug!(
            method = %req.method,
            path = %req.path,
            handler = route.descriptor.method_name(),
            args = arity,
            "Invoking handler"
        );

        let reply = route.invoke(call)?;
        encoder::encode(reply.as_ref())
    }

    /// Dispatch, turning any failure into a plain 500 response
    pub fn handle(&self, req: &Request) -> Response {
        match self.dispatch(req) {
            Ok(res) => res,
            Err(e) => {
                error!(method = %req.method, path = %req.path, error = %e, "Request failed");
                Response::failure()
            }
        }
    }
}

/// Check the number of body-bound parameters against the verb.
///
/// GET handlers take no body parameter and POST handlers at most one.
pub fn validate_shape(method: Method, path: &str, descriptor: &RouteDescriptor) -> Result<()> {
    let body_params = descriptor.body_params();
    let allowed = match method {
        Method::Get => 0,
        Method::Post => 1,
        _ => return Ok(()),
    };
    if body_params > allowed {
        return Err(Error::InvalidHandlerShape {
            method: method.as_str().to_string(),
            path: path.to_string(),
            body_params,
        });
    }
    Ok(())
}
