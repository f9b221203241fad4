//! Request options and response parsing over a pluggable HTTP transport.
//!
//! # Overview
//! `RequestConfig` holds a validated set of request options (URL, method,
//! timeouts, redirect policy, user agent). `execute` projects them into
//! `TransportParams`, hands those to a `Transport` for one blocking exchange,
//! and parses the raw transfer into a `Response`.
//!
//! # Design
//! - The transport owns DNS, TCP/TLS and redirect following. `UreqTransport`
//!   is the production implementation; tests substitute stubs.
//! - Options are a typed record. The name-based `set`/`get` API maps names
//!   onto a closed `OptionName` enum, so unknown names fail immediately.
//! - A `Response` is built once per execution and only exposes accessors.

pub mod config;
pub mod error;
pub mod options;
pub mod response;
pub mod transport;

pub use config::RequestConfig;
pub use error::RequestError;
pub use options::{OptionName, Options, DEFAULT_ALLOWED_VERBS, DEFAULT_SUCCESS_CODES};
pub use response::{canonicalize_header_name, parse_headers, parse_response, Response};
pub use transport::{
    RawTransfer, TransferDetails, Transport, TransportError, TransportParams, UreqTransport,
};
