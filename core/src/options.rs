//! Recognized request options and their defaults.
//!
//! # Design
//! `Options` is a plain record with one typed field per option. It carries no
//! validation of its own; `RequestConfig` owns the invariants and is the only
//! way options reach a transport. `OptionName` is the closed set of names
//! accepted by the name-based `set`/`get` API, aliases included.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Verbs accepted by `request_method` unless `allowed_verbs` is changed.
pub const DEFAULT_ALLOWED_VERBS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "TRACE", "OPTIONS", "CONNECT", "PATCH",
];

/// Status codes that do not mark a response as an error.
pub const DEFAULT_SUCCESS_CODES: [u16; 15] = [
    200, 201, 202, 203, 204, 205, 206, 300, 301, 302, 303, 304, 305, 306, 307,
];

pub const DEFAULT_USER_AGENT: &str = "comb";
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_METHOD: &str = "GET";

/// Every option a request can carry.
///
/// Deserializing fills missing fields from `Options::default()`, so a partial
/// JSON object is a valid source. Use `RequestConfig::try_from` to validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Follow redirects from the target service.
    pub allow_redirect: bool,
    /// Redirects to follow before the transport gives up.
    pub max_redirects: u32,
    pub user_agent: String,
    /// Expose referrer information to the target service.
    pub set_referrer: bool,
    /// Connection timeout in whole seconds. `0` disables the limit.
    pub connect_timeout: u64,
    /// Overall response timeout in whole seconds. `0` disables the limit.
    pub resp_timeout: u64,
    #[serde(alias = "method")]
    pub request_method: String,
    pub allowed_verbs: IndexSet<String>,
    #[serde(alias = "url")]
    pub service_url: Option<String>,
    pub success_codes: IndexSet<u16>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_redirect: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            set_referrer: true,
            connect_timeout: DEFAULT_TIMEOUT_SECS,
            resp_timeout: DEFAULT_TIMEOUT_SECS,
            request_method: DEFAULT_METHOD.to_string(),
            allowed_verbs: DEFAULT_ALLOWED_VERBS.iter().map(|v| v.to_string()).collect(),
            service_url: None,
            success_codes: DEFAULT_SUCCESS_CODES.into_iter().collect(),
        }
    }
}

/// A recognized option name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    AllowRedirect,
    MaxRedirects,
    UserAgent,
    SetReferrer,
    ConnectTimeout,
    RespTimeout,
    RequestMethod,
    AllowedVerbs,
    ServiceUrl,
    SuccessCodes,
}

impl OptionName {
    pub const ALL: [OptionName; 10] = [
        OptionName::AllowRedirect,
        OptionName::MaxRedirects,
        OptionName::UserAgent,
        OptionName::SetReferrer,
        OptionName::ConnectTimeout,
        OptionName::RespTimeout,
        OptionName::RequestMethod,
        OptionName::AllowedVerbs,
        OptionName::ServiceUrl,
        OptionName::SuccessCodes,
    ];

    /// Canonical name. Aliases (`method`, `url`) resolve to these.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::AllowRedirect => "allow_redirect",
            OptionName::MaxRedirects => "max_redirects",
            OptionName::UserAgent => "user_agent",
            OptionName::SetReferrer => "set_referrer",
            OptionName::ConnectTimeout => "connect_timeout",
            OptionName::RespTimeout => "resp_timeout",
            OptionName::RequestMethod => "request_method",
            OptionName::AllowedVerbs => "allowed_verbs",
            OptionName::ServiceUrl => "service_url",
            OptionName::SuccessCodes => "success_codes",
        }
    }
}

impl FromStr for OptionName {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "method" => Ok(OptionName::RequestMethod),
            "url" => Ok(OptionName::ServiceUrl),
            other => OptionName::ALL
                .into_iter()
                .find(|name| name.as_str() == other)
                .ok_or_else(|| RequestError::UnknownOption(other.to_string())),
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
