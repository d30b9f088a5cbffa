//! Typed handler adapters
//!
//! Any function or method shaped `Fn(&C, A1, ..., An) -> Result<R, E>` is a
//! handler for controller `C`, as long as every `Ai` implements [`FromArg`],
//! `R` is serializable and `E` converts into a [`BoxError`]. The adapter
//! works in two steps so that every conversion failure surfaces before a
//! controller exists:
//!
//! 1. [`Handler::convert`] turns bound arguments into the typed parameter tuple
//! 2. [`Handler::call`] runs the handler on a constructed controller

use crate::binding::{Arg, FromArg};
use crate::encoder::Reply;
use crate::{BoxError, Error, Result};
use serde::Serialize;
use std::sync::Arc;

/// A converted call, ready to construct the controller and run the handler
pub type Call = Box<dyn FnOnce() -> Result<Box<dyn Reply>>>;

/// Type-erased entry into one route: converts the bound arguments and
/// returns the pending [`Call`]
pub type Invoker = Arc<dyn Fn(Vec<Arg>) -> Result<Call> + Send + Sync>;

/// A handler for controller `C`; `T` is the tuple of parameter types
pub trait Handler<C, T>: Send + Sync + 'static {
    /// Type tokens of the declared parameters, in signature order
    fn param_types(&self) -> Vec<&'static str>;

    /// Convert positional arguments into the parameter tuple
    fn convert(&self, args: Vec<Arg>) -> Result<T>;

    /// Run the handler with already converted arguments
    fn call(&self, controller: &C, args: T) -> Result<Box<dyn Reply>>;
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<C, F, R, E, $($ty,)*> Handler<C, ($($ty,)*)> for F
        where
            F: Fn(&C, $($ty,)*) -> std::result::Result<R, E> + Send + Sync + 'static,
            R: Serialize + Send + 'static,
            E: Into<BoxError>,
            $($ty: FromArg,)*
        {
            fn param_types(&self) -> Vec<&'static str> {
                vec![$(<$ty as FromArg>::type_name(),)*]
            }

            fn convert(&self, args: Vec<Arg>) -> Result<($($ty,)*)> {
                let expected = self.param_types().len();
                if args.len() != expected {
                    return Err(Error::Invocation(format!(
                        "expected {expected} argument(s), got {}",
                        args.len()
                    )));
                }

                let mut args = args.into_iter();
                Ok(($(<$ty as FromArg>::from_arg(args.next().unwrap_or(Arg::Absent))?,)*))
            }

            fn call(&self, controller: &C, args: ($($ty,)*)) -> Result<Box<dyn Reply>> {
                let ($($ty,)*) = args;
                let value = (self)(controller, $($ty,)*).map_err(|e| {
                    let err: BoxError = e.into();
                    Error::Invocation(err.to_string())
                })?;
                Ok(Box::new(value))
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Method identifier of a handler: the last path segment of its type name
pub(crate) fn method_name<H>() -> &'static str {
    let name = std::any::type_name::<H>();
    name.rsplit("::").next().unwrap_or(name)
}
