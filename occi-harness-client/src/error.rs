//! Client-side error types.
//!
//! This module provides [`ClientError`], the error type for OCCI protocol
//! client operations.

use http::StatusCode;

/// Client-side error variants.
///
/// [`ClientError::UnexpectedStatus`] is the protocol-violation class: the
/// service answered with something other than `200 OK` or `201 Created`.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection failed, timed out, or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a status outside the success set.
    #[error("unexpected status {status} ({reason}) for {method} {path}")]
    UnexpectedStatus {
        method: http::Method,
        path: String,
        status: StatusCode,
        reason: String,
        body: String,
    },

    /// A request that was expected to be rejected succeeded.
    #[error("expected {method} {path} to be rejected, got {status}")]
    UnexpectedSuccess {
        method: http::Method,
        path: String,
        status: StatusCode,
    },

    /// A required response header was absent.
    #[error("response is missing the `{0}` header")]
    MissingHeader(&'static str),

    /// A request could not be built (invalid header value or URI).
    #[error("encode error: {0}")]
    Encode(String),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An endpoint string could not be parsed.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    /// Whether this is a protocol violation (status outside the success set).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, ClientError::UnexpectedStatus { .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::UnexpectedStatus { status, .. }
            | ClientError::UnexpectedSuccess { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw response body of a protocol violation.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}
