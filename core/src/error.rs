//! Error types for request configuration, execution and response parsing.
//!
//! # Design
//! Validation errors (`UnknownOption`, `InvalidMethod`, `InvalidUrl`,
//! `InvalidValue`) are raised at set-time and never leave a `RequestConfig`
//! half-updated. `Transport` keeps the collaborator's error as its `source()`
//! untouched so callers can downcast it to the concrete transport error.

use crate::transport::TransportError;

/// Errors returned by `RequestConfig` and the response parser.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The option name is not part of the recognized set.
    #[error("{0} is not a recognized option")]
    UnknownOption(String),

    /// The method is not a member of `allowed_verbs`.
    #[error("{0} is not a recognized HTTP verb/method")]
    InvalidMethod(String),

    /// The URL is not a syntactically valid absolute URL.
    #[error("{0} is not a syntactically valid URL")]
    InvalidUrl(String),

    /// A name-based set received a value of the wrong shape.
    #[error("invalid value for {option}: expected {expected}")]
    InvalidValue {
        option: &'static str,
        expected: &'static str,
    },

    /// `execute` was called before a target URL was configured.
    #[error("no service URL configured")]
    MissingUrl,

    /// The transport failed at the connection level.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The raw transfer has no blank line between headers and body.
    #[error("malformed response: missing header/body separator")]
    MalformedResponse,
}
