//! Route descriptors
//!
//! A descriptor names the handler behind a route (owning type and method)
//! and its declared parameters in signature order.

use crate::binding::Binding;
use crate::{Error, Result};

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Zero-based position in the handler signature
    pub position: usize,
    /// Type token of the declared parameter type
    pub type_name: &'static str,
    /// How the argument is produced from the request
    pub binding: Binding,
}

/// Immutable description of a registered handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    owner: &'static str,
    method: &'static str,
    params: Vec<Param>,
}

impl RouteDescriptor {
    /// Build a descriptor from the handler's parameter types and the
    /// bindings declared for them, pairing them by position.
    ///
    /// Fails with [`Error::Configuration`] when the counts differ.
    pub fn new(
        owner: &'static str,
        method: &'static str,
        type_names: Vec<&'static str>,
        bindings: &[Binding],
    ) -> Result<Self> {
        if type_names.len() != bindings.len() {
            return Err(Error::Configuration(format!(
                "{owner}::{method} takes {} parameter(s) but declares {} binding(s)",
                type_names.len(),
                bindings.len()
            )));
        }

        let params = type_names
            .into_iter()
            .zip(bindings.iter().copied())
            .enumerate()
            .map(|(position, (type_name, binding))| Param {
                position,
                type_name,
                binding,
            })
            .collect();

        Ok(Self {
            owner,
            method,
            params,
        })
    }

    /// Fully qualified name of the owning controller type
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Handler method identifier
    pub fn method_name(&self) -> &'static str {
        self.method
    }

    /// Declared parameters, ordered by position
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Number of body-bound parameters
    pub fn body_params(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.binding == Binding::Body)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_signature() {
        let descriptor = RouteDescriptor::new(
            "shop::Orders",
            "create",
            vec!["i64", "shop::Order", "bool"],
            &[Binding::query("id"), Binding::Body, Binding::None],
        )
        .unwrap();

        assert_eq!(descriptor.owner(), "shop::Orders");
        assert_eq!(descriptor.method_name(), "create");
        assert_eq!(descriptor.arity(), 3);
        assert_eq!(descriptor.body_params(), 1);

        let positions: Vec<_> = descriptor.params().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(descriptor.params()[1].type_name, "shop::Order");
        assert_eq!(descriptor.params()[2].binding, Binding::None);
    }

    #[test]
    fn test_binding_count_mismatch() {
        let err = RouteDescriptor::new("shop::Items", "find", vec!["i64"], &[]).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("shop::Items::find")));
    }
}
