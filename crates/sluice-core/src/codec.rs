//! Structured codec (JSON)
//!
//! The single wire format for request bodies and handler results.

use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Content type written for every encoded response
pub const CONTENT_TYPE: &str = "application/json";

/// Encode any serializable value
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Error::ResponseEncode)
}

/// Decode bytes into a value of type `T`
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(Error::BodyDecode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        qty: u32,
        note: Option<String>,
    }

    #[test]
    fn test_decode_struct() {
        let order: Order = decode(br#"{"qty":3}"#).unwrap();
        assert_eq!(order, Order { qty: 3, note: None });
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode::<Order>(b""), Err(Error::BodyDecode(_))));
        assert!(matches!(decode::<Order>(b"{\"qty\":"), Err(Error::BodyDecode(_))));
        assert!(matches!(decode::<Order>(br#"{"qty":"three"}"#), Err(Error::BodyDecode(_))));
    }

    #[test]
    fn test_encode_null() {
        assert_eq!(encode(&()).unwrap(), Bytes::from_static(b"null"));
        assert_eq!(encode(&None::<u8>).unwrap(), Bytes::from_static(b"null"));
    }
}
