//! sluice-router: Exact-match HTTP route table
//!
//! The table behind the sluice dispatcher. Routes are keyed by
//! (HTTP method, path) and hold an arbitrary value.
//!
//! ## Semantics
//! - Methods are case-insensitive (stored upper-cased)
//! - Paths match exactly; lookups trim surrounding whitespace first
//! - No placeholders, no wildcards, no trailing-slash normalization
//! - A (method, path) key can be registered once; a second insert fails
//!
//! ## Example
//! ```
//! use sluice_router::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table.insert("GET", "/status", 0).unwrap();
//! table.insert("POST", "/orders", 1).unwrap();
//!
//! assert_eq!(table.find("GET", " /status "), Some(&0));
//! assert!(table.insert("get", "/status", 2).is_err());
//! ```

use std::collections::HashMap;
use thiserror::Error;

/// A second value was registered under an existing (method, path) key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route already registered: {method} {path}")]
pub struct Conflict {
    /// Upper-cased HTTP method
    pub method: String,
    /// Path as it was registered
    pub path: String,
}

/// Route table organized by HTTP method, then by path.
///
/// Built once and then only read; `find` takes `&self` so a finished
/// table can be shared across threads without locking.
#[derive(Debug)]
pub struct RouteTable<T> {
    /// Method -> path -> value
    methods: HashMap<String, HashMap<String, T>>,
}

impl<T> RouteTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Insert a route
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - Literal path; stored as given
    /// * `value` - Value returned by `find`
    ///
    /// # Errors
    /// [`Conflict`] if the key is already taken. The existing value is kept.
    pub fn insert(&mut self, method: &str, path: &str, value: T) -> Result<(), Conflict> {
        let method = method.to_uppercase();
        let paths = self.methods.entry(method.clone()).or_default();
        if paths.contains_key(path) {
            return Err(Conflict {
                method,
                path: path.to_string(),
            });
        }
        paths.insert(path.to_string(), value);
        Ok(())
    }

    /// Find the value registered for a method and path
    ///
    /// The path is trimmed of surrounding whitespace, then compared exactly.
    pub fn find(&self, method: &str, path: &str) -> Option<&T> {
        self.methods
            .get(&method.to_uppercase())
            .and_then(|paths| paths.get(path.trim()))
    }

    /// Iterate over every (method, path, value) entry, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &T)> {
        self.methods.iter().flat_map(|(method, paths)| {
            paths
                .iter()
                .map(move |(path, value)| (method.as_str(), path.as_str(), value))
        })
    }

    /// Total number of routes
    pub fn len(&self) -> usize {
        self.methods.values().map(HashMap::len).sum()
    }

    /// Whether no route has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
