//! Client core for the measurement orchestrate service.
//!
//! # Overview
//! Fetches the list of measurement target URLs from an orchestrate service
//! reachable in one of several ways: directly over HTTP(S), as a Tor onion
//! service through a SOCKS proxy, or domain-fronted behind a CDN.
//!
//! # Design
//! - `RequestBuilder` turns `OrchestrateSettings` into a `RequestDescription`
//!   (URL, proxy, headers, timeout) and is the only place that encodes the
//!   per-backend rules.
//! - `OrchestrateClient` runs build -> `Transport::execute` -> decode. The
//!   transport is injected, so tests substitute fakes and C hosts can do the
//!   I/O themselves via `build_urls_request` / `parse_urls`.
//! - The library emits `tracing` events and leaves subscriber setup to the
//!   application.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use builder::{RequestBuilder, API_PREFIX};
pub use client::{OrchestrateClient, URLS_PATH};
pub use error::{ClientError, ConfigError, TransportError};
pub use http::{HttpResponse, RequestDescription};
pub use query::QueryParameters;
pub use transport::{Transport, UreqTransport};
pub use types::{BackendType, OrchestrateSettings, UrlEntry, UrlsResponse};
