//! Outbound responses
//!
//! The transport only needs a status, a content type and the body bytes.
//! Every request failure collapses into [`Response::failure`], so a client
//! never sees a partial or half-encoded body.

use bytes::Bytes;
use smallvec::{smallvec, SmallVec};

const FAILURE_BODY: &str = "Internal Server Error";
const FAILURE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Status handed to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully encoded response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    /// Header pairs; names are lower-case
    pub headers: SmallVec<[(&'static str, String); 2]>,
    pub body: Bytes,
}

impl Response {
    /// Successful response carrying `body` of the given content type
    pub fn encoded(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: smallvec![("content-type", content_type.to_string())],
            body: body.into(),
        }
    }

    /// Successful response with an already serialized JSON body
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::encoded(crate::codec::CONTENT_TYPE, body)
    }

    /// The uniform failure response
    pub fn failure() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: smallvec![("content-type", FAILURE_CONTENT_TYPE.to_string())],
            body: Bytes::from_static(FAILURE_BODY.as_bytes()),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as text, if it is valid UTF-8
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }
}
