//! sluice-core: route registration and typed handler dispatch
//!
//! Controllers declare handlers with explicit bindings; the scanner turns
//! the controllers under an application's package into an immutable route
//! registry, and the dispatcher runs each request through
//! lookup, shape check, binding, invocation and JSON encoding.
//!
//! ## Features
//! - `native` - hyper/tokio HTTP transport ([`server::Server`])

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod binding;
pub mod codec;
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod discovery;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod logging;
pub mod registry;
pub mod request;
pub mod response;
pub mod scanner;

#[cfg(feature = "native")]
pub mod server;

// Re-exports
pub use binding::{Arg, Binding, FromArg, Json, Scalar};
pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use controller::{Application, Controller, Routes};
pub use descriptor::{Param, RouteDescriptor};
pub use discovery::Catalog;
pub use dispatcher::Dispatcher;
pub use error::{BoxError, Error, Result};
pub use handler::Handler;
pub use registry::{Route, RouteRegistry};
pub use request::{Method, QueryMap, Request, RequestBuilder};
pub use response::{Response, StatusCode};
pub use scanner::Scanner;

#[cfg(feature = "native")]
pub use server::{create_optimized_socket, from_hyper_request, to_hyper_response, Server};

// Used by the registration macros
#[doc(hidden)]
pub use inventory;
