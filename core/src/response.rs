//! Structured view of a raw transfer.
//!
//! # Design
//! The transport hands back one string holding the header block and the body,
//! plus metadata it already knows (final status code, timings). Status comes
//! from that metadata; the header block is only mined for `name: value` pairs.
//! A `Response` is built once and exposes read-only accessors.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::RequestError;
use crate::transport::TransferDetails;

const SEPARATOR: &str = "\r\n\r\n";

/// Parsed result of one executed request.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    status_code: u16,
    headers_raw: String,
    body_raw: String,
    headers: IndexMap<String, String>,
    details: TransferDetails,
    is_error: bool,
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Header block as received, status line included, folds intact.
    pub fn headers_raw(&self) -> &str {
        &self.headers_raw
    }

    pub fn body_raw(&self) -> &str {
        &self.body_raw
    }

    /// Headers keyed by canonical name, in first-seen order.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Look up a header by any spelling of its name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonicalize_header_name(name))
            .map(String::as_str)
    }

    pub fn details(&self) -> &TransferDetails {
        &self.details
    }

    /// True when the status code is outside the configured success codes.
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Build a `Response` from a transport's raw output and metadata.
pub fn parse_response(
    raw: &str,
    success_codes: &IndexSet<u16>,
    details: TransferDetails,
) -> Result<Response, RequestError> {
    let (headers_raw, body_raw) = raw
        .split_once(SEPARATOR)
        .ok_or(RequestError::MalformedResponse)?;

    let headers = parse_headers(headers_raw);
    let status_code = details.status_code;
    let is_error = !success_codes.contains(&status_code);
    log::trace!(
        "parsed response: status={status_code} headers={} body_bytes={}",
        headers.len(),
        body_raw.len()
    );

    Ok(Response {
        status_code,
        headers_raw: headers_raw.to_string(),
        body_raw: body_raw.to_string(),
        headers,
        details,
        is_error,
    })
}

/// Parse a header block into canonical name/value pairs.
///
/// Lines that are not `name: value` (the status line among them) are skipped.
/// A repeated name keeps its first position and takes the last value.
pub fn parse_headers(block: &str) -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    for line in unfold_headers(block).split("\r\n") {
        if let Some((name, value)) = split_header_line(line) {
            headers.insert(canonicalize_header_name(name), value.to_string());
        }
    }
    headers
}

/// Join folded continuation lines: CRLF followed by spaces/tabs becomes one space.
pub fn unfold_headers(block: &str) -> String {
    let mut out = String::with_capacity(block.len());
    let mut rest = block;
    while let Some(pos) = rest.find("\r\n") {
        out.push_str(&rest[..pos]);
        let next = &rest[pos + 2..];
        let continued = next.trim_start_matches([' ', '\t']);
        if continued.len() < next.len() {
            out.push(' ');
        } else {
            out.push_str("\r\n");
        }
        rest = continued;
    }
    out.push_str(rest);
    out
}

fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = line.split_once(':')?;
    let value = rest.strip_prefix(' ')?;
    let name = name.trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

fn is_word_separator(c: char) -> bool {
    matches!(c, '-' | ' ' | '\t')
}

/// Title-case a header name per hyphen/space/tab separated word.
///
/// `content-type`, `CONTENT-TYPE` and `Content-Type` all become `Content-Type`.
/// Case mapping is ASCII only; other characters pass through unchanged.
pub fn canonicalize_header_name(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    // Each token keeps its trailing separator.
    for token in lowered.split_inclusive(is_word_separator) {
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
