//! The transport boundary and its `ureq` implementation.
//!
//! # Design
//! `RequestConfig` never touches the network itself. It projects its options
//! into `TransportParams` and hands them to a `Transport`, which returns the
//! raw transfer (status line, header block, blank line, body) together with
//! metadata about the exchange. Tests plug in stubs; production code uses
//! `UreqTransport`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connection-level failure reported by a transport, passed through as-is.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Parameters for a single exchange, derived from `RequestConfig` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportParams {
    pub url: String,
    pub method: String,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: String,
    /// Send a `Referer` on redirect hops. `UreqTransport` cannot honor this:
    /// ureq sets no automatic `Referer`, so the flag is ignored there.
    pub auto_referrer: bool,
    /// `None` means no limit.
    pub connect_timeout: Option<Duration>,
    /// `None` means no limit.
    pub response_timeout: Option<Duration>,
    /// Keep the header block in the raw output.
    pub include_headers: bool,
    /// Return the body in memory rather than streaming it.
    pub return_transfer: bool,
}

/// Metadata about a completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub status_code: u16,
    /// URL of the final response, after any redirects.
    pub effective_url: String,
    /// Wall-clock duration of the exchange in seconds.
    pub total_time: f64,
    pub header_size: usize,
    pub size_download: usize,
    pub content_type: Option<String>,
    /// Transport-specific statistics.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Raw output of a transport: headers and body concatenated with a blank line.
#[derive(Debug, Clone)]
pub struct RawTransfer {
    pub raw: String,
    pub details: TransferDetails,
}

/// Performs one blocking HTTP exchange.
pub trait Transport {
    fn perform(&self, params: &TransportParams) -> Result<RawTransfer, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(&self, params: &TransportParams) -> Result<RawTransfer, TransportError> {
        (**self).perform(params)
    }
}

/// `Transport` backed by a `ureq` agent created for each call.
///
/// HTTP error statuses are returned as data; only connection-level failures
/// (DNS, refused connections, timeouts, TLS, too many redirects) are errors.
/// Bodies are read whole with no size limit. `TransportParams::auto_referrer`
/// is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(params: &TransportParams) -> ureq::Agent {
        let max_redirects = if params.follow_redirects {
            params.max_redirects
        } else {
            0
        };
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(max_redirects)
            .max_redirects_will_error(params.follow_redirects)
            .user_agent(params.user_agent.as_str())
            .timeout_connect(params.connect_timeout)
            .timeout_global(params.response_timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn perform(&self, params: &TransportParams) -> Result<RawTransfer, TransportError> {
        use ureq::ResponseExt;

        if params.auto_referrer {
            log::trace!("auto_referrer ignored: ureq sends no automatic Referer");
        }

        let agent = Self::agent(params);
        let request = ureq::http::Request::builder()
            .method(params.method.as_str())
            .uri(params.url.as_str())
            .body(())?;

        let started = Instant::now();
        let mut response = agent.run(request)?;
        let effective_url = response.get_uri().to_string();
        let status = response.status();
        let version = response.version();

        let mut head = format!(
            "{version:?} {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        for (name, value) in response.headers() {
            head.push_str(name.as_str());
            head.push_str(": ");
            head.push_str(&String::from_utf8_lossy(value.as_bytes()));
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let content_type = response
            .headers()
            .get(ureq::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = if params.return_transfer {
            response.body_mut().with_config().limit(u64::MAX).read_to_vec()?
        } else {
            Vec::new()
        };
        let total_time = started.elapsed().as_secs_f64();

        let details = TransferDetails {
            status_code: status.as_u16(),
            effective_url,
            total_time,
            header_size: head.len(),
            size_download: body.len(),
            content_type,
            extra: Map::new(),
        };

        let mut raw = if params.include_headers {
            head
        } else {
            String::new()
        };
        raw.push_str(&String::from_utf8_lossy(&body));

        Ok(RawTransfer { raw, details })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransportParams {
        TransportParams {
            url: "http://localhost".to_string(),
            method: "GET".to_string(),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: "comb".to_string(),
            auto_referrer: true,
            connect_timeout: Some(Duration::from_secs(1)),
            response_timeout: Some(Duration::from_secs(1)),
            include_headers: true,
            return_transfer: true,
        }
    }

    struct Fixed;

    impl Transport for Fixed {
        fn perform(&self, params: &TransportParams) -> Result<RawTransfer, TransportError> {
            Ok(RawTransfer {
                raw: format!("X-Method: {}\r\n\r\n", params.method),
                details: TransferDetails {
                    status_code: 200,
                    ..TransferDetails::default()
                },
            })
        }
    }

    fn perform_with<T: Transport>(transport: T) -> RawTransfer {
        transport.perform(&params()).unwrap()
    }

    #[test]
    fn references_are_transports() {
        let transport = Fixed;
        let transfer = perform_with(&transport);
        assert_eq!(transfer.raw, "X-Method: GET\r\n\r\n");
    }

    #[test]
    fn invalid_uri_is_a_transport_error() {
        let mut params = params();
        params.url = "http://exa mple.com".to_string();
        assert!(UreqTransport::new().perform(&params).is_err());
    }

    #[test]
    fn details_serialize_without_empty_extra() {
        let details = TransferDetails {
            status_code: 204,
            effective_url: "http://localhost/".to_string(),
            ..TransferDetails::default()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["status_code"], 204);
        assert_eq!(json["effective_url"], "http://localhost/");
        assert!(json.get("extra").is_none());
    }
}
