//! Error types for the orchestrate client.
//!
//! # Design
//! Errors are layered the same way the pipeline is: `ConfigError` covers
//! settings that can never produce a valid request, `TransportError` covers
//! everything between handing a request to the transport and holding a
//! response, and `ClientError` wraps both and adds the decode failures. Every
//! variant that follows a network call carries the request URL so the caller
//! can log a useful line without extra context.

use thiserror::Error;

/// Settings that cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("orchestrate address is empty")]
    MissingAddress,

    /// `DomainFronted` needs the CDN hostname used for the TLS connection.
    #[error("domain fronted backend requires a front hostname")]
    MissingFront,

    /// `Onion` needs the SOCKS proxy that reaches the Tor network.
    #[error("onion backend requires a socks proxy")]
    MissingProxy,

    #[error("unknown backend type: {0}")]
    UnknownBackend(String),

    /// Configuration input could not be read (bad JSON, bad number, ...).
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while executing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid proxy {proxy}: {message}")]
    InvalidProxy { proxy: String, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS or proxy tunnel failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with status >= 400.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors returned by `OrchestrateClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The call itself broke its contract; nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The body is not UTF-8 JSON.
    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// Valid JSON, but not `{"results": [{"url": ...}]}`.
    #[error("unexpected response schema from {url}: {message}")]
    UnexpectedSchema { url: String, message: String },
}

impl ClientError {
    /// Only transport failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// HTTP status carried by the error, if the service answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Transport {
                source: TransportError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}
