//! Argument binding
//!
//! Turns request data into positional handler arguments:
//!
//! ```text
//! descriptor params (in position order)
//!     Binding::Query  → query map lookup → scalar coercion → Arg::Scalar / Arg::Absent
//!     Binding::Body   → raw body bytes                     → Arg::Body
//!     Binding::None   →                                      Arg::Absent
//! ```
//!
//! Handlers then take typed values out of each [`Arg`] through [`FromArg`];
//! a body is decoded straight from its bytes into the parameter type.

use crate::descriptor::RouteDescriptor;
use crate::request::QueryMap;
use crate::{codec, Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Per-parameter binding marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Bind a named query parameter
    Query { name: &'static str, required: bool },
    /// The entire request body
    Body,
    /// Bind nothing; the argument is absent
    None,
}

impl Binding {
    /// Required query parameter
    pub const fn query(name: &'static str) -> Self {
        Binding::Query {
            name,
            required: true,
        }
    }

    /// Optional query parameter
    pub const fn optional(name: &'static str) -> Self {
        Binding::Query {
            name,
            required: false,
        }
    }
}

/// A query value coerced to one of the supported scalar types
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Long(i64),
    Int(i32),
    Double(f64),
    Char(char),
    Bool(bool),
    Text(String),
}

impl Scalar {
    /// Coerce a raw query value to the type named by `type_name`.
    ///
    /// # Errors
    /// - [`Error::UnknownType`] if the type is not in the coercion table
    /// - [`Error::Coercion`] if the value does not parse
    pub fn coerce(type_name: &str, name: &str, raw: &str) -> Result<Self> {
        let invalid = || Error::Coercion {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: raw.to_string(),
        };

        match type_name {
            "i64" => raw.parse().map(Scalar::Long).map_err(|_| invalid()),
            "i32" => raw.parse().map(Scalar::Int).map_err(|_| invalid()),
            "f64" => raw.parse().map(Scalar::Double).map_err(|_| invalid()),
            "bool" => raw.parse().map(Scalar::Bool).map_err(|_| invalid()),
            "char" => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Scalar::Char(c)),
                    _ => Err(invalid()),
                }
            }
            "String" => Ok(Scalar::Text(raw.to_string())),
            other => Err(Error::UnknownType(other.to_string())),
        }
    }

    /// Whether `type_name` is in the coercion table
    pub fn supports(type_name: &str) -> bool {
        matches!(type_name, "i64" | "i32" | "f64" | "bool" | "char" | "String")
    }
}

/// A bound positional argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Absent,
    Scalar(Scalar),
    Body(Bytes),
}

impl Arg {
    fn describe(&self) -> &'static str {
        match self {
            Arg::Absent => "absent value",
            Arg::Scalar(Scalar::Long(_)) => "i64",
            Arg::Scalar(Scalar::Int(_)) => "i32",
            Arg::Scalar(Scalar::Double(_)) => "f64",
            Arg::Scalar(Scalar::Char(_)) => "char",
            Arg::Scalar(Scalar::Bool(_)) => "bool",
            Arg::Scalar(Scalar::Text(_)) => "String",
            Arg::Body(_) => "request body",
        }
    }
}

/// Produce the positional arguments for a handler.
///
/// Parameters are bound in position order; the first failure aborts.
pub fn bind(descriptor: &RouteDescriptor, query: &QueryMap, body: &Bytes) -> Result<Vec<Arg>> {
    descriptor
        .params()
        .iter()
        .map(|param| match param.binding {
            Binding::Query { name, required } => {
                if !Scalar::supports(param.type_name) {
                    return Err(Error::UnknownType(param.type_name.to_string()));
                }
                match query.get(name).filter(|v| !v.is_empty()) {
                    Some(raw) => Scalar::coerce(param.type_name, name, raw).map(Arg::Scalar),
                    None if required => Err(Error::MissingQueryParameter(name.to_string())),
                    None => Ok(Arg::Absent),
                }
            }
            Binding::Body => Ok(Arg::Body(body.clone())),
            Binding::None => Ok(Arg::Absent),
        })
        .collect()
}

/// Conversion from a bound [`Arg`] into a handler parameter type
pub trait FromArg: Sized {
    /// Type token recorded in the route descriptor
    fn type_name() -> &'static str;

    fn from_arg(arg: Arg) -> Result<Self>;
}

fn mismatch(expected: &str, arg: &Arg) -> Error {
    Error::Invocation(format!(
        "argument type mismatch: expected {expected}, got {}",
        arg.describe()
    ))
}

macro_rules! scalar_arg {
    ($ty:ty, $token:literal, $variant:ident) => {
        impl FromArg for $ty {
            fn type_name() -> &'static str {
                $token
            }

            fn from_arg(arg: Arg) -> Result<Self> {
                match arg {
                    Arg::Scalar(Scalar::$variant(value)) => Ok(value),
                    Arg::Body(body) => codec::decode(&body),
                    other => Err(mismatch($token, &other)),
                }
            }
        }
    };
}

scalar_arg!(i64, "i64", Long);
scalar_arg!(i32, "i32", Int);
scalar_arg!(f64, "f64", Double);
scalar_arg!(char, "char", Char);
scalar_arg!(bool, "bool", Bool);
scalar_arg!(String, "String", Text);

impl<T: FromArg> FromArg for Option<T> {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn from_arg(arg: Arg) -> Result<Self> {
        match arg {
            Arg::Absent => Ok(None),
            other => T::from_arg(other).map(Some),
        }
    }
}

impl FromArg for serde_json::Value {
    fn type_name() -> &'static str {
        "serde_json::Value"
    }

    fn from_arg(arg: Arg) -> Result<Self> {
        match arg {
            Arg::Body(body) => codec::decode(&body),
            other => Err(mismatch("serde_json::Value", &other)),
        }
    }
}

/// A request body decoded into `T`
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned> FromArg for Json<T> {
    fn type_name() -> &'static str {
        std::any::type_name::<T>()
    }

    fn from_arg(arg: Arg) -> Result<Self> {
        match arg {
            Arg::Body(body) => codec::decode(&body).map(Json),
            other => Err(mismatch(std::any::type_name::<T>(), &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        qty: u32,
    }

    fn empty() -> Bytes {
        Bytes::new()
    }

    fn descriptor(types: Vec<&'static str>, bindings: &[Binding]) -> RouteDescriptor {
        RouteDescriptor::new("tests::Owner", "handler", types, bindings).unwrap()
    }

    #[test]
    fn test_required_query_present() {
        let d = descriptor(vec!["i64"], &[Binding::query("id")]);
        let args = bind(&d, &QueryMap::parse(Some("id=42")), &empty()).unwrap();
        assert_eq!(args, vec![Arg::Scalar(Scalar::Long(42))]);
    }

    #[test]
    fn test_required_query_missing() {
        let d = descriptor(vec!["i64"], &[Binding::query("id")]);
        let err = bind(&d, &QueryMap::parse(None), &empty()).unwrap_err();
        assert!(matches!(err, Error::MissingQueryParameter(name) if name == "id"));
    }

    #[test]
    fn test_required_query_empty_is_missing() {
        let d = descriptor(vec!["String"], &[Binding::query("name")]);
        let err = bind(&d, &QueryMap::parse(Some("name=")), &empty()).unwrap_err();
        assert!(matches!(err, Error::MissingQueryParameter(_)));
    }

    #[test]
    fn test_optional_query_absent() {
        let d = descriptor(vec!["String", "i32"], &[Binding::optional("q"), Binding::optional("page")]);
        let args = bind(&d, &QueryMap::parse(Some("page=")), &empty()).unwrap();
        assert_eq!(args, vec![Arg::Absent, Arg::Absent]);
    }

    #[test]
    fn test_coercion_table() {
        assert_eq!(Scalar::coerce("i64", "n", "-7").unwrap(), Scalar::Long(-7));
        assert_eq!(Scalar::coerce("i32", "n", "42").unwrap(), Scalar::Int(42));
        assert_eq!(Scalar::coerce("f64", "n", "2.5").unwrap(), Scalar::Double(2.5));
        assert_eq!(Scalar::coerce("char", "c", "x").unwrap(), Scalar::Char('x'));
        assert_eq!(Scalar::coerce("bool", "b", "true").unwrap(), Scalar::Bool(true));
        assert_eq!(
            Scalar::coerce("String", "s", "hello").unwrap(),
            Scalar::Text("hello".to_string())
        );
    }

    #[test]
    fn test_coercion_failures() {
        assert!(matches!(
            Scalar::coerce("i64", "id", "abc"),
            Err(Error::Coercion { name, value, .. }) if name == "id" && value == "abc"
        ));
        assert!(matches!(Scalar::coerce("i32", "n", "9999999999"), Err(Error::Coercion { .. })));
        assert!(matches!(Scalar::coerce("char", "c", "xy"), Err(Error::Coercion { .. })));
        assert!(matches!(Scalar::coerce("shop::Order", "o", "1"), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_unknown_type_fails_even_when_absent() {
        let d = descriptor(vec!["shop::Filter"], &[Binding::optional("filter")]);
        let err = bind(&d, &QueryMap::parse(None), &empty()).unwrap_err();
        assert!(matches!(err, Error::UnknownType(t) if t == "shop::Filter"));
    }

    #[test]
    fn test_body_binding() {
        let d = descriptor(vec!["Order"], &[Binding::Body]);
        let args = bind(&d, &QueryMap::default(), &Bytes::from_static(br#"{"qty":3}"#)).unwrap();
        assert_eq!(args, vec![Arg::Body(Bytes::from_static(br#"{"qty":3}"#))]);

        let Json(order) = Json::<Order>::from_arg(args.into_iter().next().unwrap()).unwrap();
        assert_eq!(order, Order { qty: 3 });
    }

    #[test]
    fn test_body_decode_error() {
        let err = Json::<Order>::from_arg(Arg::Body(Bytes::from_static(b"{not json"))).unwrap_err();
        assert!(matches!(err, Error::BodyDecode(_)));

        let err = Json::<Order>::from_arg(Arg::Body(Bytes::from_static(b"{\n  \"qty\": \"x\"\n}"))).unwrap_err();
        match err {
            Error::BodyDecode(e) => assert!(e.line() == 2 && e.column() > 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_body_numbers_decode_from_source_text() {
        let big = Json::<u128>::from_arg(Arg::Body(Bytes::from_static(b"340282366920938463463374607431768211455")));
        assert_eq!(big.unwrap().0, u128::MAX);

        let err = Json::<u64>::from_arg(Arg::Body(Bytes::from_static(b"18446744073709551616"))).unwrap_err();
        assert!(matches!(err, Error::BodyDecode(_)));
    }

    #[test]
    fn test_unbound_parameter_is_absent() {
        let d = descriptor(vec!["String"], &[Binding::None]);
        let args = bind(&d, &QueryMap::parse(Some("x=1")), &empty()).unwrap();
        assert_eq!(args, vec![Arg::Absent]);
    }

    #[test]
    fn test_from_arg_conversions() {
        assert_eq!(i64::from_arg(Arg::Scalar(Scalar::Long(5))).unwrap(), 5);
        assert_eq!(Option::<i64>::from_arg(Arg::Absent).unwrap(), None);
        assert_eq!(Option::<char>::from_arg(Arg::Scalar(Scalar::Char('z'))).unwrap(), Some('z'));
        assert_eq!(String::from_arg(Arg::Body(Bytes::from_static(b"\"raw\""))).unwrap(), "raw");
        assert_eq!(
            serde_json::Value::from_arg(Arg::Body(Bytes::from_static(b"[1]"))).unwrap(),
            serde_json::json!([1])
        );
        assert_eq!(Option::<i32>::type_name(), "i32");

        let err = i64::from_arg(Arg::Absent).unwrap_err();
        assert!(matches!(err, Error::Invocation(msg) if msg.contains("absent value")));
        let err = i32::from_arg(Arg::Scalar(Scalar::Long(1))).unwrap_err();
        assert!(matches!(err, Error::Invocation(_)));
    }
}
