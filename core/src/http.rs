//! HTTP request and response described as plain data.
//!
//! # Design
//! The builder produces a `RequestDescription` and the client consumes an
//! `HttpResponse`; whoever sits in between (a `Transport` implementation or a
//! C host) performs the actual I/O. All fields use owned types so values can
//! cross the FFI boundary without lifetime concerns.

use std::time::Duration;

/// Everything a transport needs to perform one GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescription {
    /// Absolute URL. Its host is the one used for DNS, TCP and TLS.
    pub url: String,
    /// Proxy URI to tunnel through, e.g. `socks5h://127.0.0.1:9050`.
    pub proxy: Option<String>,
    /// Extra headers, in the order they were added. May contain `Host`.
    pub headers: Vec<(String, String)>,
    /// Deadline for the whole exchange, redirects included.
    pub timeout: Option<Duration>,
}

impl RequestDescription {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Host the service sees: the `Host` override if set, else the URL host.
    pub fn logical_host(&self) -> Option<&str> {
        self.header("host").or_else(|| self.connection_host())
    }

    /// Host the network sees: the authority of `url`.
    pub fn connection_host(&self) -> Option<&str> {
        let rest = self.url.split_once("://")?.1;
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        Some(&rest[..end])
    }
}

/// Final status and complete body of an executed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}
