//! Handler scanning
//!
//! Builds the route registry from the entry point's component-scan package:
//!
//! 1. resolve the entry point in the catalog and instantiate it
//! 2. read its scan marker, deriving the package from the entry point's
//!    namespace when the marker is blank
//! 3. collect every controller in that package and register each handler
//!    under `context_path + prefix + suffix`
//!
//! Any failure aborts the scan; no partial registry is returned.

use crate::discovery::{namespace, Catalog};
use crate::registry::{Route, RouteRegistry};
use crate::{Error, Result};
use tracing::{debug, info};

/// Scans a [`Catalog`] into a [`RouteRegistry`]
#[derive(Debug)]
pub struct Scanner<'a> {
    catalog: &'a Catalog,
    context_path: String,
}

impl<'a> Scanner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            context_path: "/".to_string(),
        }
    }

    /// Global route prefix; absent or blank means `"/"`
    pub fn context_path(mut self, context_path: Option<&str>) -> Self {
        self.context_path = match context_path.map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => "/".to_string(),
        };
        self
    }

    /// Build the registry for `entry_point`
    pub fn scan(&self, entry_point: Option<&str>) -> Result<RouteRegistry> {
        let entry_point = entry_point
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Configuration("entry point is not defined".to_string()))?;

        let application = self.catalog.find_application(entry_point).ok_or_else(|| {
            Error::Configuration(format!("entry point {entry_point} cannot be found"))
        })?;
        application.instantiate().map_err(|e| {
            Error::Configuration(format!("entry point {entry_point} cannot be instantiated: {e}"))
        })?;

        let marker = application.component_scan.ok_or_else(|| {
            Error::Configuration(format!(
                "entry point {entry_point} has no component-scan marker"
            ))
        })?;

        let package = match marker.trim() {
            "" => package_of(entry_point)?,
            package => package,
        };
        debug!(entry_point, package, context_path = %self.context_path, "Scanning for handlers");

        let mut registry = RouteRegistry::new();
        for controller in self.catalog.controllers_in(package) {
            let prefix = controller.prefix.unwrap_or("/");
            for method in controller.routes()? {
                let path = join_path(&self.context_path, prefix, &method.suffix);
                debug!(
                    method = %method.verb,
                    path = %path,
                    owner = method.descriptor.owner(),
                    handler = method.descriptor.method_name(),
                    "Registering route"
                );
                registry.register(method.verb, &path, Route::new(method.descriptor, method.invoker))?;
            }
        }

        info!(routes = registry.len(), package, "Route registry built");
        Ok(registry)
    }
}

/// Package an entry point lives in.
///
/// A bare type name has no enclosing namespace and cannot be scanned.
pub fn package_of(entry_point: &str) -> Result<&str> {
    namespace(entry_point)
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "cannot derive a package from entry point {entry_point}"
            ))
        })
}

/// Full route path: context path followed by the trimmed prefix and suffix,
/// with runs of `/` collapsed.
pub fn join_path(context_path: &str, prefix: &str, suffix: &str) -> String {
    let raw = format!("{context_path}{}", format!("{prefix}{suffix}").trim());
    let mut path = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '/' && path.ends_with('/') {
            continue;
        }
        path.push(c);
    }
    path
}
