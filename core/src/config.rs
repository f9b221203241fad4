//! Validated request configuration and execution.
//!
//! # Design
//! `RequestConfig` wraps an `Options` record and is the only thing allowed to
//! mutate it. Every setter validates before writing, so a failed call leaves
//! the previous value in place. The name-based `set`/`get` pair parses the name
//! into an `OptionName` and forwards to the typed accessor for that option.

use std::time::Duration;

use indexmap::IndexSet;
use serde_json::Value;
use url::Url;

use crate::error::RequestError;
use crate::options::{OptionName, Options};
use crate::response::{parse_response, Response};
use crate::transport::{Transport, TransportParams};

/// A set of request options that always satisfies its invariants:
/// `request_method` is one of `allowed_verbs`, and `service_url` is either
/// unset or a valid absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    options: Options,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, validating each one.
    ///
    /// `allowed_verbs` and `request_method` are validated together, so a
    /// mapping may replace the verb set and select a verb from it at once.
    pub fn with_options<I, K>(options: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut config = Self::new();
        let mut verbs = None;
        let mut method = None;
        for (name, value) in options {
            match name.as_ref().parse::<OptionName>()? {
                OptionName::AllowedVerbs => verbs = Some(parse_verbs(&value)?),
                OptionName::RequestMethod => {
                    method = Some(expect_str(OptionName::RequestMethod, &value)?.to_string())
                }
                other => config.set_named(other, value)?,
            }
        }
        match (verbs, method) {
            (Some(verbs), method) => {
                let method = method.unwrap_or_else(|| config.options.request_method.clone());
                config.replace_verbs(verbs, method)?;
            }
            (None, Some(method)) => config.set_request_method(&method)?,
            (None, None) => {}
        }
        Ok(config)
    }

    /// Build from a JSON object of option names to values.
    pub fn from_json_str(json: &str) -> Result<Self, RequestError> {
        let map = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(RequestError::InvalidValue {
                    option: "options",
                    expected: "a JSON object",
                })
            }
        };
        Self::with_options(map)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // ------------------------------------------------------------------
    // Name-based access
    // ------------------------------------------------------------------

    /// Set an option by name. Accepts the aliases `method` and `url`.
    pub fn set(&mut self, option: &str, value: Value) -> Result<(), RequestError> {
        let name = option.parse::<OptionName>()?;
        self.set_named(name, value)
    }

    /// Read an option by name. An unset URL reads as `null`.
    pub fn get(&self, option: &str) -> Result<Value, RequestError> {
        let name = option.parse::<OptionName>()?;
        Ok(self.get_named(name))
    }

    pub fn set_named(&mut self, name: OptionName, value: Value) -> Result<(), RequestError> {
        match name {
            OptionName::AllowRedirect => self.set_allow_redirect(expect_bool(name, &value)?),
            OptionName::MaxRedirects => {
                let max = expect_u64(name, &value)?;
                let max = u32::try_from(max).map_err(|_| invalid(name))?;
                self.set_max_redirects(max);
            }
            OptionName::UserAgent => self.set_user_agent(expect_str(name, &value)?),
            OptionName::SetReferrer => self.set_set_referrer(expect_bool(name, &value)?),
            OptionName::ConnectTimeout => self.set_connect_timeout(expect_u64(name, &value)?),
            OptionName::RespTimeout => self.set_resp_timeout(expect_u64(name, &value)?),
            OptionName::RequestMethod => self.set_request_method(expect_str(name, &value)?)?,
            OptionName::AllowedVerbs => self.set_allowed_verbs(parse_verbs(&value)?)?,
            OptionName::ServiceUrl => match value {
                Value::Null => self.clear_service_url(),
                ref other => self.set_service_url(expect_str(name, other)?)?,
            },
            OptionName::SuccessCodes => {
                let codes = expect_array(name, &value)?
                    .iter()
                    .map(|code| {
                        code.as_u64()
                            .and_then(|c| u16::try_from(c).ok())
                            .ok_or_else(|| invalid(name))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_success_codes(codes);
            }
        }
        Ok(())
    }

    pub fn get_named(&self, name: OptionName) -> Value {
        let o = &self.options;
        match name {
            OptionName::AllowRedirect => Value::from(o.allow_redirect),
            OptionName::MaxRedirects => Value::from(o.max_redirects),
            OptionName::UserAgent => Value::from(o.user_agent.as_str()),
            OptionName::SetReferrer => Value::from(o.set_referrer),
            OptionName::ConnectTimeout => Value::from(o.connect_timeout),
            OptionName::RespTimeout => Value::from(o.resp_timeout),
            OptionName::RequestMethod => Value::from(o.request_method.as_str()),
            OptionName::AllowedVerbs => o.allowed_verbs.iter().map(String::as_str).collect(),
            OptionName::ServiceUrl => o.service_url.as_deref().map_or(Value::Null, Value::from),
            OptionName::SuccessCodes => o.success_codes.iter().copied().collect(),
        }
    }

    // ------------------------------------------------------------------
    // Typed accessors
    // ------------------------------------------------------------------

    pub fn allow_redirect(&self) -> bool {
        self.options.allow_redirect
    }

    pub fn set_allow_redirect(&mut self, allow: bool) {
        self.options.allow_redirect = allow;
    }

    pub fn max_redirects(&self) -> u32 {
        self.options.max_redirects
    }

    pub fn set_max_redirects(&mut self, max: u32) {
        self.options.max_redirects = max;
    }

    pub fn user_agent(&self) -> &str {
        &self.options.user_agent
    }

    pub fn set_user_agent(&mut self, agent: &str) {
        self.options.user_agent = agent.to_string();
    }

    pub fn set_referrer(&self) -> bool {
        self.options.set_referrer
    }

    pub fn set_set_referrer(&mut self, expose: bool) {
        self.options.set_referrer = expose;
    }

    pub fn connect_timeout(&self) -> u64 {
        self.options.connect_timeout
    }

    pub fn set_connect_timeout(&mut self, secs: u64) {
        self.options.connect_timeout = secs;
    }

    pub fn resp_timeout(&self) -> u64 {
        self.options.resp_timeout
    }

    pub fn set_resp_timeout(&mut self, secs: u64) {
        self.options.resp_timeout = secs;
    }

    pub fn request_method(&self) -> &str {
        &self.options.request_method
    }

    /// Matching is case-sensitive: `get` is not `GET`.
    pub fn set_request_method(&mut self, method: &str) -> Result<(), RequestError> {
        if !self.options.allowed_verbs.contains(method) {
            return Err(RequestError::InvalidMethod(method.to_string()));
        }
        self.options.request_method = method.to_string();
        Ok(())
    }

    pub fn allowed_verbs(&self) -> &IndexSet<String> {
        &self.options.allowed_verbs
    }

    /// Replace the verb set. Fails if the current method would no longer be
    /// allowed. Duplicates collapse, first occurrence wins.
    pub fn set_allowed_verbs<I, S>(&mut self, verbs: I) -> Result<(), RequestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let verbs = verbs.into_iter().map(Into::into).collect();
        let method = self.options.request_method.clone();
        self.replace_verbs(verbs, method)
    }

    fn replace_verbs(&mut self, verbs: IndexSet<String>, method: String) -> Result<(), RequestError> {
        if !verbs.contains(&method) {
            return Err(RequestError::InvalidMethod(method));
        }
        self.options.allowed_verbs = verbs;
        self.options.request_method = method;
        Ok(())
    }

    pub fn service_url(&self) -> Option<&str> {
        self.options.service_url.as_deref()
    }

    /// Accepts absolute URLs with both a scheme and a host. The string is
    /// stored as given, not normalized.
    pub fn set_service_url(&mut self, url: &str) -> Result<(), RequestError> {
        match Url::parse(url) {
            Ok(parsed) if parsed.has_host() => {
                self.options.service_url = Some(url.to_string());
                Ok(())
            }
            _ => Err(RequestError::InvalidUrl(url.to_string())),
        }
    }

    pub fn clear_service_url(&mut self) {
        self.options.service_url = None;
    }

    pub fn success_codes(&self) -> &IndexSet<u16> {
        &self.options.success_codes
    }

    pub fn set_success_codes<I: IntoIterator<Item = u16>>(&mut self, codes: I) {
        self.options.success_codes = codes.into_iter().collect();
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Project the options into the parameters a transport consumes.
    pub fn transport_params(&self) -> Result<TransportParams, RequestError> {
        let o = &self.options;
        let url = o.service_url.clone().ok_or(RequestError::MissingUrl)?;
        Ok(TransportParams {
            url,
            method: o.request_method.clone(),
            follow_redirects: o.allow_redirect,
            max_redirects: o.max_redirects,
            user_agent: o.user_agent.clone(),
            auto_referrer: o.set_referrer,
            connect_timeout: seconds(o.connect_timeout),
            response_timeout: seconds(o.resp_timeout),
            include_headers: true,
            return_transfer: true,
        })
    }

    /// Perform the request once through `transport` and parse the result.
    ///
    /// Transport failures are returned as `RequestError::Transport` with the
    /// transport's error as the source. No retries are attempted.
    pub fn execute<T: Transport>(&self, transport: T) -> Result<Response, RequestError> {
        let params = self.transport_params()?;
        log::debug!("executing {} {}", params.method, params.url);

        let transfer = transport.perform(&params).map_err(|err| {
            log::warn!("{} {} failed: {err}", params.method, params.url);
            RequestError::Transport(err)
        })?;

        let response = parse_response(&transfer.raw, &self.options.success_codes, transfer.details)?;
        log::debug!(
            "{} {} -> {} (error: {})",
            params.method,
            params.url,
            response.status_code(),
            response.is_error()
        );
        Ok(response)
    }
}

impl TryFrom<Options> for RequestConfig {
    type Error = RequestError;

    fn try_from(options: Options) -> Result<Self, Self::Error> {
        let mut config = Self::new();
        config.replace_verbs(options.allowed_verbs, options.request_method.clone())?;
        if let Some(url) = options.service_url.as_deref() {
            config.set_service_url(url)?;
        }
        config.set_allow_redirect(options.allow_redirect);
        config.set_max_redirects(options.max_redirects);
        config.set_user_agent(&options.user_agent);
        config.set_set_referrer(options.set_referrer);
        config.set_connect_timeout(options.connect_timeout);
        config.set_resp_timeout(options.resp_timeout);
        config.set_success_codes(options.success_codes);
        Ok(config)
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn invalid(name: OptionName) -> RequestError {
    RequestError::InvalidValue {
        option: name.as_str(),
        expected: expected_shape(name),
    }
}

fn expected_shape(name: OptionName) -> &'static str {
    match name {
        OptionName::AllowRedirect | OptionName::SetReferrer => "a boolean",
        OptionName::MaxRedirects => "a non-negative 32-bit integer",
        OptionName::ConnectTimeout | OptionName::RespTimeout => "a non-negative integer",
        OptionName::UserAgent | OptionName::RequestMethod => "a string",
        OptionName::ServiceUrl => "a string or null",
        OptionName::AllowedVerbs => "an array of strings",
        OptionName::SuccessCodes => "an array of status codes",
    }
}

fn expect_bool(name: OptionName, value: &Value) -> Result<bool, RequestError> {
    value.as_bool().ok_or_else(|| invalid(name))
}

fn expect_u64(name: OptionName, value: &Value) -> Result<u64, RequestError> {
    value.as_u64().ok_or_else(|| invalid(name))
}

fn expect_str(name: OptionName, value: &Value) -> Result<&str, RequestError> {
    value.as_str().ok_or_else(|| invalid(name))
}

fn expect_array(name: OptionName, value: &Value) -> Result<&Vec<Value>, RequestError> {
    value.as_array().ok_or_else(|| invalid(name))
}

fn parse_verbs(value: &Value) -> Result<IndexSet<String>, RequestError> {
    let name = OptionName::AllowedVerbs;
    expect_array(name, value)?
        .iter()
        .map(|verb| verb.as_str().map(str::to_string).ok_or_else(|| invalid(name)))
        .collect()
}
