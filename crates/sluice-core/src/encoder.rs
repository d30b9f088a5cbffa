//! Response encoding
//!
//! Handler results are type-erased as [`Reply`] so that the dispatcher can
//! encode them without knowing the concrete return type.

use crate::{codec, Response, Result};
use bytes::Bytes;
use serde::Serialize;

/// A handler return value awaiting encoding
pub trait Reply: Send {
    /// Serialize with the structured codec
    fn to_bytes(&self) -> Result<Bytes>;
}

impl<T: Serialize + Send> Reply for T {
    fn to_bytes(&self) -> Result<Bytes> {
        codec::encode(self)
    }
}

/// Encode a handler result as the full response.
///
/// Content type is always JSON. Nothing is produced unless the whole
/// value serializes; failures come back as [`crate::Error::ResponseEncode`].
pub fn encode(reply: &dyn Reply) -> Result<Response> {
    let body = reply.to_bytes()?;
    Ok(Response::json(body))
}
