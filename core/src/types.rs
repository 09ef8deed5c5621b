//! Domain types for the orchestrate API.
//!
//! # Design
//! `OrchestrateSettings` is plain data with public fields so it can be built
//! in code, deserialized from configuration, or filled in from the C ABI.
//! Its invariants (front for fronting, proxy for onion) are checked when a
//! request is built rather than on construction, so a half-filled settings
//! value can still be passed around and completed later.
//!
//! The response DTOs mirror the service's JSON but are defined independently
//! from the mock-server crate; integration tests catch schema drift.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the orchestrate service is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Plain HTTP straight to `address`.
    Http,
    /// HTTPS straight to `address`.
    #[default]
    Https,
    /// Plain HTTP to an onion `address` through a SOCKS proxy.
    Onion,
    /// HTTPS to a CDN `front`, with `Host: address` inside the TLS session.
    DomainFronted,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Http => "http",
            BackendType::Https => "https",
            BackendType::Onion => "onion",
            BackendType::DomainFronted => "domain_fronted",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(BackendType::Http),
            "https" => Ok(BackendType::Https),
            "onion" => Ok(BackendType::Onion),
            "domain_fronted" | "domain-fronted" => Ok(BackendType::DomainFronted),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Where and how to reach the orchestrate service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrchestrateSettings {
    /// Host of the real service, optionally with a port.
    pub address: String,

    #[serde(rename = "type", default)]
    pub backend: BackendType,

    /// CDN hostname seen by the network. Only used by `DomainFronted`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub front: String,

    /// Proxy URI such as `socks5h://127.0.0.1:9050`. Only used by `Onion`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub socks_config: String,

    #[serde(
        rename = "timeout_secs",
        default,
        with = "duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl OrchestrateSettings {
    pub fn https(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            backend: BackendType::Https,
            ..Self::default()
        }
    }

    pub fn http(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            backend: BackendType::Http,
            ..Self::default()
        }
    }

    pub fn onion(address: impl Into<String>, socks_config: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            backend: BackendType::Onion,
            socks_config: socks_config.into(),
            ..Self::default()
        }
    }

    pub fn domain_fronted(address: impl Into<String>, front: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            backend: BackendType::DomainFronted,
            front: front.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the backend-specific requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        match self.backend {
            BackendType::DomainFronted if self.front.trim().is_empty() => {
                Err(ConfigError::MissingFront)
            }
            BackendType::Onion if self.socks_config.trim().is_empty() => {
                Err(ConfigError::MissingProxy)
            }
            _ => Ok(()),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.filter(|s| *s > 0).map(Duration::from_secs))
    }
}

/// Body of `GET /api/v1/urls`. Fields other than `results` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlsResponse {
    pub results: Vec<UrlEntry>,
}

/// One measurement target. Only `url` is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlEntry {
    pub url: String,
}
