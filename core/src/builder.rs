//! Turns `OrchestrateSettings` into a concrete `RequestDescription`.
//!
//! # Design
//! The builder is the only place that knows how each backend reaches the
//! service. For every backend it decides two hosts:
//!
//! - the *connection* host, which is written into the URL and therefore
//!   drives DNS, TCP and the TLS handshake (SNI and certificate check);
//! - the *logical* host, which the origin server reads from `Host`.
//!
//! They are the same host except for domain fronting, where the URL names
//! the CDN front and an explicit `Host` header names the real service.

use crate::error::ConfigError;
use crate::http::RequestDescription;
use crate::query::QueryParameters;
use crate::types::{BackendType, OrchestrateSettings};

/// Every endpoint of the orchestrate API lives under this prefix.
pub const API_PREFIX: &str = "/api/v1";

/// Builds requests for one settings value. Never mutates the settings.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    settings: &'a OrchestrateSettings,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(settings: &'a OrchestrateSettings) -> Self {
        Self { settings }
    }

    /// Build a GET request for `{API_PREFIX}{path}` with `query` appended.
    ///
    /// Fails before anything touches the network if the settings cannot
    /// satisfy their backend.
    pub fn build(&self, path: &str, query: &QueryParameters) -> Result<RequestDescription, ConfigError> {
        let settings = self.settings;
        settings.validate()?;

        let address = trim_host(&settings.address);
        let mut proxy = None;
        let mut headers = Vec::new();

        let (scheme, connection_host) = match settings.backend {
            BackendType::Http => ("http", address),
            BackendType::Https => ("https", address),
            BackendType::Onion => {
                proxy = Some(settings.socks_config.trim().to_string());
                ("http", address)
            }
            BackendType::DomainFronted => {
                headers.push(("Host".to_string(), address.to_string()));
                ("https", trim_host(&settings.front))
            }
        };

        let mut url = format!("{scheme}://{connection_host}{API_PREFIX}");
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);

        let encoded = query.encode();
        if !encoded.is_empty() {
            url.push('?');
            url.push_str(&encoded);
        }

        tracing::debug!(
            backend = %settings.backend,
            url = %url,
            host_override = !headers.is_empty(),
            proxied = proxy.is_some(),
            "built orchestrate request"
        );

        Ok(RequestDescription {
            url,
            proxy,
            headers,
            timeout: settings.timeout,
        })
    }
}

fn trim_host(host: &str) -> &str {
    host.trim().trim_end_matches('/')
}
