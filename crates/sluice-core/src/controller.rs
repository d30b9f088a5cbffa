//! Controllers and applications
//!
//! A controller groups handlers under a path prefix and declares them in
//! [`Controller::routes`]. An application is the configured entry point:
//! it carries the component-scan marker and is instantiated once at scan
//! time.
//!
//! ```
//! use sluice_core::{Binding, BoxError, Controller, Routes};
//!
//! struct Items;
//!
//! impl Items {
//!     fn find(&self, id: i64) -> Result<String, BoxError> {
//!         Ok(format!("item {id}"))
//!     }
//! }
//!
//! impl Controller for Items {
//!     const PATH: Option<&'static str> = Some("/items");
//!
//!     fn create() -> Result<Self, BoxError> {
//!         Ok(Items)
//!     }
//!
//!     fn routes(routes: &mut Routes<Self>) {
//!         routes.get("", Self::find, &[Binding::query("id")]);
//!     }
//! }
//! ```

use crate::binding::{Arg, Binding};
use crate::descriptor::RouteDescriptor;
use crate::encoder::Reply;
use crate::handler::{method_name, Call, Handler, Invoker};
use crate::{BoxError, Error, Method, Result};
use std::marker::PhantomData;
use std::sync::Arc;

/// A type whose methods handle requests
pub trait Controller: Sized + 'static {
    /// Path prefix for every route of this controller; `None` means `"/"`
    const PATH: Option<&'static str> = None;

    /// Factory called once per request to get a fresh instance
    fn create() -> std::result::Result<Self, BoxError>;

    /// Declare the handlers of this controller
    fn routes(routes: &mut Routes<Self>);
}

/// The configured entry point of an application
pub trait Application: Sized + 'static {
    /// Component-scan marker. `None` means the marker is missing; a blank
    /// value scans the entry point's own namespace.
    const COMPONENT_SCAN: Option<&'static str> = None;

    /// Factory called once when the entry point is resolved
    fn create() -> std::result::Result<Self, BoxError>;
}

/// One declared handler, ready to be registered
pub struct HandlerMethod {
    pub verb: Method,
    /// Path suffix appended to the controller prefix
    pub suffix: String,
    pub descriptor: RouteDescriptor,
    pub invoker: Invoker,
}

impl std::fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("verb", &self.verb)
            .field("suffix", &self.suffix)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Collects the handler declarations of controller `C`
pub struct Routes<C> {
    methods: Vec<HandlerMethod>,
    errors: Vec<Error>,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> Routes<C> {
    fn new() -> Self {
        Self {
            methods: Vec::new(),
            errors: Vec::new(),
            _controller: PhantomData,
        }
    }

    /// Declare a GET handler
    pub fn get<T: 'static, H: Handler<C, T>>(&mut self, suffix: &str, handler: H, bindings: &[Binding]) -> &mut Self {
        self.add(Method::Get, suffix, handler, bindings)
    }

    /// Declare a POST handler
    pub fn post<T: 'static, H: Handler<C, T>>(&mut self, suffix: &str, handler: H, bindings: &[Binding]) -> &mut Self {
        self.add(Method::Post, suffix, handler, bindings)
    }

    fn add<T: 'static, H: Handler<C, T>>(
        &mut self,
        verb: Method,
        suffix: &str,
        handler: H,
        bindings: &[Binding],
    ) -> &mut Self {
        let owner = std::any::type_name::<C>();
        let descriptor = match RouteDescriptor::new(
            owner,
            method_name::<H>(),
            handler.param_types(),
            bindings,
        ) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                self.errors.push(e);
                return self;
            }
        };

        // Conversion runs eagerly; the controller only exists once it succeeded
        let handler = Arc::new(handler);
        let invoker: Invoker = Arc::new(move |args: Vec<Arg>| -> Result<Call> {
            let typed = handler.convert(args)?;
            let handler = Arc::clone(&handler);
            let call: Call = Box::new(move || -> Result<Box<dyn Reply>> {
                let controller = C::create()
                    .map_err(|e| Error::Invocation(format!("failed to construct {owner}: {e}")))?;
                handler.call(&controller, typed)
            });
            Ok(call)
        });

        self.methods.push(HandlerMethod {
            verb,
            suffix: suffix.to_string(),
            descriptor,
            invoker,
        });
        self
    }

    /// Run `C::routes` and return its declarations in order.
    ///
    /// The first invalid declaration fails the whole controller.
    pub fn collect() -> Result<Vec<HandlerMethod>> {
        let mut routes = Self::new();
        C::routes(&mut routes);
        match routes.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(routes.methods),
        }
    }
}
