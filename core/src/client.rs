//! Fetches measurement target URLs from the orchestrate service.
//!
//! # Design
//! `OrchestrateClient` holds immutable settings and a `Transport`; it carries
//! no mutable state between calls, so one instance can serve concurrent
//! callers. `get_urls` is a straight pipeline:
//!
//! build request -> execute -> check status -> decode JSON -> append
//!
//! Each stage short-circuits with its own `ClientError` variant. The build
//! and decode stages are also exposed on their own (`build_urls_request`,
//! `parse_urls`) for hosts that perform the HTTP round-trip themselves.

use crate::builder::RequestBuilder;
use crate::error::{ClientError, TransportError};
use crate::http::{HttpResponse, RequestDescription};
use crate::query::{QueryParameters, LIST_SEPARATOR};
use crate::transport::{Transport, UreqTransport};
use crate::types::{OrchestrateSettings, UrlsResponse};

pub const URLS_PATH: &str = "/urls";

/// Longest body excerpt kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct OrchestrateClient<T = UreqTransport> {
    settings: OrchestrateSettings,
    transport: T,
}

impl OrchestrateClient<UreqTransport> {
    /// Client that talks to the network through `UreqTransport`.
    pub fn new(settings: OrchestrateSettings) -> Self {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> OrchestrateClient<T> {
    pub fn with_transport(settings: OrchestrateSettings, transport: T) -> Self {
        Self { settings, transport }
    }

    pub fn settings(&self) -> &OrchestrateSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch target URLs and append them to `out`.
    ///
    /// Existing contents of `out` are kept. On error `out` is left exactly as
    /// it was: either every URL of the response is appended, in service
    /// order, or none is.
    pub fn get_urls<S: AsRef<str>>(
        &self,
        country_code: &str,
        category_codes: &[S],
        limit: u32,
        out: &mut Vec<String>,
    ) -> Result<(), ClientError> {
        let request = self.build_urls_request(country_code, category_codes, limit)?;

        tracing::info!(url = %request.url, backend = %self.settings.backend, "fetching measurement targets");
        let response = self
            .transport
            .execute(&request)
            .map_err(|source| {
                tracing::warn!(url = %request.url, error = %source, "orchestrate request failed");
                ClientError::Transport {
                    url: request.url.clone(),
                    source,
                }
            })?;

        self.parse_urls(&request.url, &response, out)
    }

    /// Like `get_urls`, into a fresh list.
    pub fn fetch_urls<S: AsRef<str>>(
        &self,
        country_code: &str,
        category_codes: &[S],
        limit: u32,
    ) -> Result<Vec<String>, ClientError> {
        let mut urls = Vec::new();
        self.get_urls(country_code, category_codes, limit, &mut urls)?;
        Ok(urls)
    }

    /// Build the `GET /api/v1/urls` request without sending it.
    pub fn build_urls_request<S: AsRef<str>>(
        &self,
        country_code: &str,
        category_codes: &[S],
        limit: u32,
    ) -> Result<RequestDescription, ClientError> {
        for code in category_codes {
            let code = code.as_ref();
            if code.is_empty() || code.contains(LIST_SEPARATOR) {
                return Err(ClientError::InvalidArgument(format!(
                    "invalid category code: {code:?}"
                )));
            }
        }

        let mut query = QueryParameters::new();
        if !country_code.is_empty() {
            query.insert("country_code", country_code);
        }
        if !category_codes.is_empty() {
            query.insert_list("category_codes", category_codes);
        }
        if limit > 0 {
            query.insert("limit", limit.to_string());
        }

        Ok(RequestBuilder::new(&self.settings).build(URLS_PATH, &query)?)
    }

    /// Check the status of `response` to the request for `url`, decode its
    /// body and append the URLs to `out`.
    pub fn parse_urls(&self, url: &str, response: &HttpResponse, out: &mut Vec<String>) -> Result<(), ClientError> {
        check_status(url, response)?;
        let urls = decode_urls(url, &response.body)?;
        tracing::info!(url, count = urls.len(), "received measurement targets");
        out.extend(urls);
        Ok(())
    }
}

fn check_status(url: &str, response: &HttpResponse) -> Result<(), ClientError> {
    if !response.is_error() {
        return Ok(());
    }
    let mut body = String::from_utf8_lossy(&response.body).into_owned();
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    tracing::warn!(url, status = response.status, "orchestrate service returned an error status");
    Err(ClientError::Transport {
        url: url.to_string(),
        source: TransportError::Status {
            status: response.status,
            body,
        },
    })
}

/// Decode `{"results": [{"url": ...}, ...]}` into the URLs in order.
fn decode_urls(url: &str, body: &[u8]) -> Result<Vec<String>, ClientError> {
    let malformed = |message: String| ClientError::MalformedResponse {
        url: url.to_string(),
        message,
    };

    let text = std::str::from_utf8(body).map_err(|e| malformed(e.to_string()))?;
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    let parsed: UrlsResponse = serde_json::from_value(value).map_err(|e| ClientError::UnexpectedSchema {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(parsed.results.into_iter().map(|entry| entry.url).collect())
}
