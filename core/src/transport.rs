//! Executing a `RequestDescription` over the network.
//!
//! # Design
//! `Transport` is the seam between the deterministic core and real I/O. The
//! client receives one at construction; tests inject a fake, and the default
//! `UreqTransport` does blocking HTTP with proxy, header and redirect support.
//!
//! A transport reports what the server said. Status codes >= 400 come back as
//! an ordinary `HttpResponse`; interpreting them is the client's job.

use std::sync::Arc;

use crate::error::TransportError;
use crate::http::{HttpResponse, RequestDescription};

pub trait Transport: Send + Sync {
    fn execute(&self, request: &RequestDescription) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &RequestDescription) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &RequestDescription) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &RequestDescription) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Blocking transport backed by `ureq`.
///
/// A fresh agent is built per request because proxy and timeout are
/// per-request properties; nothing is pooled between calls.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    user_agent: String,
    max_redirects: u32,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            user_agent: concat!("orchestrate-core/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    fn agent(&self, request: &RequestDescription) -> Result<ureq::Agent, TransportError> {
        let proxy = match request.proxy.as_deref() {
            Some(uri) => Some(parse_proxy(uri)?),
            None => None,
        };

        Ok(ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(self.max_redirects)
            .timeout_global(request.timeout)
            .proxy(proxy)
            .build()
            .new_agent())
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &RequestDescription) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(request)?;

        let mut builder = agent
            .get(&request.url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec().map_err(map_ureq_error)?;

        tracing::debug!(status, bytes = body.len(), "orchestrate response received");
        Ok(HttpResponse { status, body })
    }
}

/// The URI is handed to ureq as is: `socks5h` must keep name resolution on
/// the proxy, since onion names only resolve inside Tor.
fn parse_proxy(uri: &str) -> Result<ureq::Proxy, TransportError> {
    ureq::Proxy::new(uri).map_err(|e| TransportError::InvalidProxy {
        proxy: uri.to_string(),
        message: e.to_string(),
    })
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        other => TransportError::Request(other.to_string()),
    }
}
