//! The network seam between request building and response parsing.
//!
//! # Design
//! `Transport` is the only place that performs network I/O. The core hands
//! it an `HttpRequest` and a TLS policy and expects an `HttpResponse` back for
//! every status code. Tests substitute a spy; production code uses
//! `UreqTransport`.

use std::io::Read;
use std::time::Duration;

use tracing::{debug, instrument};
use ureq::{Agent, SendBody};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::tls::TlsPolicy;

/// Submits one request and returns the raw response.
///
/// Implementations must return 4xx/5xx responses as `Ok` so the caller can
/// apply its own accepted-status set, and must consume (drop) the request
/// body exactly once.
pub trait Transport {
    fn send<B: Read>(
        &self,
        request: HttpRequest<B>,
        tls: Option<&TlsPolicy>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a fresh `ureq::Agent` per call.
///
/// The agent is built per call because the TLS policy is a per-call input.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the whole call (connect, upload, response) by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn agent(&self, tls: Option<&TlsPolicy>) -> Result<Agent, TransportError> {
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout);
        if let Some(policy) = tls {
            config = config.tls_config(policy.to_ureq()?);
        }
        Ok(config.build().new_agent())
    }
}

impl Transport for UreqTransport {
    #[instrument(skip_all, fields(method = request.method.as_str(), url = %request.url))]
    fn send<B: Read>(
        &self,
        request: HttpRequest<B>,
        tls: Option<&TlsPolicy>,
    ) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(tls)?;
        let HttpRequest {
            method,
            url,
            headers,
            mut body,
        } = request;

        let mut builder = match method {
            HttpMethod::Post => agent.post(url.as_str()),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.send(SendBody::from_reader(&mut body))?;
        drop(body);

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.body_mut().read_to_vec()?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
