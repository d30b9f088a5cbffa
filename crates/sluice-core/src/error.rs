//! Error types for sluice-core

use thiserror::Error;

/// Result type alias for sluice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by application code (handlers and factories)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for scanning and dispatch
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid entry point, scan marker or handler declaration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two handlers declared for the same (method, path)
    #[error("Route conflict: {method} {path} is already registered")]
    RouteConflict { method: String, path: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Route not found
    #[error("Route not found: {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// Body-bound parameter count not allowed for the method
    #[error("Invalid handler shape for {method} {path}: {body_params} body parameter(s)")]
    InvalidHandlerShape {
        method: String,
        path: String,
        body_params: usize,
    },

    /// Required query parameter absent or empty
    #[error("Missing required query parameter: {0}")]
    MissingQueryParameter(String),

    /// Query value could not be coerced to the declared type
    #[error("Cannot coerce query parameter {name}={value:?} to {type_name}")]
    Coercion {
        name: String,
        type_name: String,
        value: String,
    },

    /// Query-bound parameter declared with a type outside the coercion table
    #[error("Unsupported query parameter type: {0}")]
    UnknownType(String),

    /// Request body could not be decoded into the declared type
    #[error("Failed to decode request body: {0}")]
    BodyDecode(#[source] serde_json::Error),

    /// Handler return value could not be encoded
    #[error("Failed to encode response: {0}")]
    ResponseEncode(#[source] serde_json::Error),

    /// Handler construction or handler code failed
    #[error("Handler invocation failed: {0}")]
    Invocation(String),

    /// IO error (native only)
    #[cfg(feature = "native")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hyper error (native only)
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Hyper(String),
}

impl Error {
    /// Whether this error aborts startup rather than a single request
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::RouteConflict { .. } | Error::ConfigLoad(_)
        )
    }
}

impl From<sluice_router::Conflict> for Error {
    fn from(conflict: sluice_router::Conflict) -> Self {
        Error::RouteConflict {
            method: conflict.method,
            path: conflict.path,
        }
    }
}
