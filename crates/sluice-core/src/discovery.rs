//! Type discovery
//!
//! A [`Catalog`] lists the applications and controllers the scanner may
//! see. It is filled explicitly, or from every `application!` and
//! `controller!` registration linked into the binary.

use crate::controller::{Application, Controller, HandlerMethod, Routes};
use crate::{BoxError, Result};

/// A discoverable controller type
#[derive(Debug, Clone, Copy)]
pub struct ControllerEntry {
    type_name: fn() -> &'static str,
    /// Declared path prefix
    pub prefix: Option<&'static str>,
    routes: fn() -> Result<Vec<HandlerMethod>>,
}

impl ControllerEntry {
    pub const fn of<C: Controller>() -> Self {
        Self {
            type_name: std::any::type_name::<C>,
            prefix: C::PATH,
            routes: Routes::<C>::collect,
        }
    }

    /// Fully qualified type name
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Handler declarations, in declaration order
    pub fn routes(&self) -> Result<Vec<HandlerMethod>> {
        (self.routes)()
    }
}

/// A discoverable application entry point
#[derive(Debug, Clone, Copy)]
pub struct ApplicationEntry {
    type_name: fn() -> &'static str,
    /// Component-scan marker value
    pub component_scan: Option<&'static str>,
    instantiate: fn() -> std::result::Result<(), BoxError>,
}

impl ApplicationEntry {
    pub const fn of<A: Application>() -> Self {
        Self {
            type_name: std::any::type_name::<A>,
            component_scan: A::COMPONENT_SCAN,
            instantiate: instantiate::<A>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Run the application factory, discarding the instance
    pub fn instantiate(&self) -> std::result::Result<(), BoxError> {
        (self.instantiate)()
    }
}

fn instantiate<A: Application>() -> std::result::Result<(), BoxError> {
    A::create().map(drop)
}

inventory::collect!(ControllerEntry);
inventory::collect!(ApplicationEntry);

/// Register a controller for link-time discovery
///
/// ```ignore
/// sluice_core::controller!(Orders);
/// ```
#[macro_export]
macro_rules! controller {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::ControllerEntry::of::<$ty>()
        }
    };
}

/// Register an application entry point for link-time discovery
#[macro_export]
macro_rules! application {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::ApplicationEntry::of::<$ty>()
        }
    };
}

/// The set of types visible to the scanner
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    applications: Vec<ApplicationEntry>,
    controllers: Vec<ControllerEntry>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of every registered type, ordered by type name
    pub fn discover() -> Self {
        let mut catalog = Self::new();
        for entry in inventory::iter::<ApplicationEntry> {
            catalog.push_application(*entry);
        }
        for entry in inventory::iter::<ControllerEntry> {
            catalog.push_controller(*entry);
        }
        catalog.applications.sort_by_key(|e| e.type_name());
        catalog.controllers.sort_by_key(|e| e.type_name());
        catalog
    }

    pub fn application<A: Application>(mut self) -> Self {
        self.push_application(ApplicationEntry::of::<A>());
        self
    }

    pub fn controller<C: Controller>(mut self) -> Self {
        self.push_controller(ControllerEntry::of::<C>());
        self
    }

    fn push_application(&mut self, entry: ApplicationEntry) {
        if self.find_application(entry.type_name()).is_none() {
            self.applications.push(entry);
        }
    }

    fn push_controller(&mut self, entry: ControllerEntry) {
        let name = entry.type_name();
        if !self.controllers.iter().any(|c| c.type_name() == name) {
            self.controllers.push(entry);
        }
    }

    /// Look up an application by its fully qualified type name
    pub fn find_application(&self, name: &str) -> Option<&ApplicationEntry> {
        self.applications.iter().find(|a| a.type_name() == name)
    }

    /// Controllers declared in `package` or one of its sub-namespaces
    pub fn controllers_in<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a ControllerEntry> + 'a {
        self.controllers
            .iter()
            .filter(move |c| namespace(c.type_name()).is_some_and(|ns| within(ns, package)))
    }

    pub fn controllers(&self) -> &[ControllerEntry] {
        &self.controllers
    }
}

/// Enclosing namespace of a type name, ignoring generic arguments
pub fn namespace(type_name: &str) -> Option<&str> {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit_once("::").map(|(ns, _)| ns)
}

fn within(namespace: &str, package: &str) -> bool {
    namespace == package
        || namespace
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with("::"))
}
