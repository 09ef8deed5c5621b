//! C-ABI wrapper around `orchestrate-core`.
//!
//! # Overview
//! Exposes the orchestrate client through `extern "C"` functions so C and
//! C++ measurement engines can fetch test lists without linking to Rust
//! directly. Two modes are offered:
//!
//! - host-does-IO: `orchestrate_build_urls_request` yields the URL, proxy and
//!   headers to use, or a coded error; the host performs the request and
//!   hands the response to `orchestrate_parse_urls`.
//! - library-does-IO: `orchestrate_get_urls` runs the whole pipeline with
//!   the built-in blocking transport.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Fallible calls return an envelope (`FfiRequestResult`, `FfiUrlsResult`)
//!   carrying an error code and message next to the payload.
//! - The C caller owns all returned pointers and must call the matching
//!   `orchestrate_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use orchestrate_core::{HttpResponse, OrchestrateClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client from `settings`.
///
/// Returns null if `settings` is null, names an unknown backend or holds a
/// string that is not valid UTF-8; when
/// `error_out` is non-null the reason is written there (`Ok` on success).
/// Backend requirements such as a missing front are reported when a request
/// is built, not here. The caller must free the returned pointer with
/// `orchestrate_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_client_new(
    settings: *const FfiOrchestrateSettings,
    error_out: *mut FfiErrorCode,
) -> *mut FfiOrchestrateClient {
    let (client, code) = catch_unwind(|| {
        if settings.is_null() {
            return (std::ptr::null_mut(), FfiErrorCode::InvalidArgument);
        }
        let settings = unsafe { &*settings };
        match settings.to_core() {
            Ok(settings) => {
                let client = FfiOrchestrateClient {
                    inner: OrchestrateClient::new(settings),
                };
                (Box::into_raw(Box::new(client)), FfiErrorCode::Ok)
            }
            Err(err) => (std::ptr::null_mut(), FfiErrorCode::from(&err)),
        }
    })
    .unwrap_or((std::ptr::null_mut(), FfiErrorCode::Panic));

    if !error_out.is_null() {
        unsafe { *error_out = code };
    }
    client
}

/// Free a client created by `orchestrate_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_client_free(client: *mut FfiOrchestrateClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Read `len` category codes from a C array. Null with `len == 0` is an
/// empty list; any null or non-UTF-8 entry makes the whole list unusable.
fn read_category_codes(codes: *const *const c_char, len: u32) -> Option<Vec<String>> {
    if len == 0 {
        return Some(Vec::new());
    }
    if codes.is_null() {
        return None;
    }
    let ptrs = unsafe { std::slice::from_raw_parts(codes, len as usize) };
    ptrs.iter().map(|p| read_c_str(*p)).collect()
}

// ---------------------------------------------------------------------------
// Host-does-IO
// ---------------------------------------------------------------------------

/// Build the request for fetching test URLs.
///
/// `country_code` may be null (no country filter). `category_codes` points to
/// `category_codes_len` C strings; it may be null when the length is zero.
/// `limit == 0` means no limit. Strings that are not valid UTF-8 are
/// rejected with `InvalidArgument`; settings that cannot produce a request
/// report their `ConfigError` code. The request is `result->request`.
/// The caller must free the returned pointer with
/// `orchestrate_free_request_result`.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_build_urls_request(
    client: *const FfiOrchestrateClient,
    country_code: *const c_char,
    category_codes: *const *const c_char,
    category_codes_len: u32,
    limit: u32,
) -> *mut FfiRequestResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiRequestResult::invalid_arg("client");
        }
        let client = unsafe { &*client };
        let Some(country) = read_optional_c_str(country_code) else {
            return FfiRequestResult::invalid_arg("country_code");
        };
        let Some(categories) = read_category_codes(category_codes, category_codes_len) else {
            return FfiRequestResult::invalid_arg("category_codes");
        };
        match client.inner.build_urls_request(&country, &categories, limit) {
            Ok(req) => FfiRequestResult::ok(req),
            Err(e) => FfiRequestResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiRequestResult::panic("panic in orchestrate_build_urls_request"))
}

/// Decode the response to a request built by `orchestrate_build_urls_request`.
///
/// Statuses >= 400 are reported as `Transport` with `http_status` set.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_parse_urls(
    client: *const FfiOrchestrateClient,
    request: *const FfiHttpRequest,
    response: *const FfiHttpResponse,
) -> *mut FfiUrlsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiUrlsResult::invalid_arg("client");
        }
        if request.is_null() {
            return FfiUrlsResult::invalid_arg("request");
        }
        if response.is_null() {
            return FfiUrlsResult::invalid_arg("response");
        }
        let client = unsafe { &*client };
        let request = unsafe { &*request };
        let response = unsafe { &*response };

        let Some(url) = read_c_str(request.url) else {
            return FfiUrlsResult::invalid_arg("request.url");
        };
        let Some(body) = response.body() else {
            return FfiUrlsResult::invalid_arg("response.body");
        };

        let mut urls = Vec::new();
        let core_resp = HttpResponse::new(response.status, body);
        match client.inner.parse_urls(&url, &core_resp, &mut urls) {
            Ok(()) => FfiUrlsResult::ok_urls(urls),
            Err(e) => FfiUrlsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiUrlsResult::panic("panic in orchestrate_parse_urls"))
}

// ---------------------------------------------------------------------------
// Library-does-IO
// ---------------------------------------------------------------------------

/// Fetch test URLs, performing the blocking HTTP request in-process.
///
/// Arguments follow `orchestrate_build_urls_request`.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_get_urls(
    client: *const FfiOrchestrateClient,
    country_code: *const c_char,
    category_codes: *const *const c_char,
    category_codes_len: u32,
    limit: u32,
) -> *mut FfiUrlsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiUrlsResult::invalid_arg("client");
        }
        let client = unsafe { &*client };
        let Some(country) = read_optional_c_str(country_code) else {
            return FfiUrlsResult::invalid_arg("country_code");
        };
        let Some(categories) = read_category_codes(category_codes, category_codes_len) else {
            return FfiUrlsResult::invalid_arg("category_codes");
        };
        match client.inner.fetch_urls(&country, &categories, limit) {
            Ok(urls) => FfiUrlsResult::ok_urls(urls),
            Err(e) => FfiUrlsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiUrlsResult::panic("panic in orchestrate_get_urls"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiRequestResult` returned by `orchestrate_build_urls_request`,
/// including the request it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_free_request_result(result: *mut FfiRequestResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_request(result.request);
    });
}

fn free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let req = unsafe { Box::from_raw(req) };
    free_c_string(req.url);
    free_c_string(req.proxy);
    if !req.headers.is_null() && req.headers_len > 0 {
        let headers = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ))
        };
        for h in headers.iter() {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }
}

/// Free an `FfiUrlsResult` returned by `orchestrate_parse_urls` or
/// `orchestrate_get_urls`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn orchestrate_free_result(result: *mut FfiUrlsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.urls.is_null() && result.urls_len > 0 {
            let urls = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.urls,
                    result.urls_len as usize,
                ))
            };
            for url in urls.iter() {
                free_c_string(*url);
            }
        }
    });
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    /// Owns the C strings behind an `FfiOrchestrateSettings`.
    struct Settings {
        address: CString,
        front: CString,
        socks: CString,
        backend: u32,
    }

    impl Settings {
        fn new(address: &str, backend: FfiBackendType, front: &str, socks: &str) -> Self {
            Self {
                address: CString::new(address).unwrap(),
                front: CString::new(front).unwrap(),
                socks: CString::new(socks).unwrap(),
                backend: backend as u32,
            }
        }

        fn ffi(&self) -> FfiOrchestrateSettings {
            FfiOrchestrateSettings {
                address: self.address.as_ptr(),
                backend: self.backend,
                front: self.front.as_ptr(),
                socks_config: self.socks.as_ptr(),
                timeout_secs: 5,
            }
        }
    }

    fn new_client(settings: &Settings) -> *mut FfiOrchestrateClient {
        let mut code = FfiErrorCode::Panic;
        let client = orchestrate_client_new(&settings.ffi(), &mut code);
        assert_eq!(code, FfiErrorCode::Ok);
        assert!(!client.is_null());
        client
    }

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn build_with_no_filters(client: *const FfiOrchestrateClient) -> *mut FfiRequestResult {
        orchestrate_build_urls_request(client, std::ptr::null(), std::ptr::null(), 0, 0)
    }

    /// The request carried by a successful build result.
    fn request_of<'a>(result: *mut FfiRequestResult) -> &'a FfiHttpRequest {
        assert!(!result.is_null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert!(!r.request.is_null());
        unsafe { &*r.request }
    }

    /// Error code and message of a failed build result.
    fn build_error(result: *mut FfiRequestResult) -> (FfiErrorCode, String) {
        assert!(!result.is_null());
        let r = unsafe { &*result };
        assert!(r.request.is_null());
        assert!(!r.error_message.is_null());
        (r.error_code, c_str(r.error_message).to_string())
    }

    #[test]
    fn client_new_and_free() {
        let settings = Settings::new("orchestrate.example.org", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        orchestrate_client_free(client);
    }

    #[test]
    fn client_new_null_settings() {
        let mut code = FfiErrorCode::Ok;
        let client = orchestrate_client_new(std::ptr::null(), &mut code);
        assert!(client.is_null());
        assert_eq!(code, FfiErrorCode::InvalidArgument);
    }

    #[test]
    fn client_new_unknown_backend() {
        let mut settings = Settings::new("a.example", FfiBackendType::Https, "", "");
        settings.backend = 42;
        let mut code = FfiErrorCode::Ok;
        let client = orchestrate_client_new(&settings.ffi(), &mut code);
        assert!(client.is_null());
        assert_eq!(code, FfiErrorCode::UnknownBackend);
    }

    #[test]
    fn client_new_rejects_non_utf8_address() {
        let settings = Settings::new("a.example", FfiBackendType::Https, "", "");
        let address = CString::new(vec![0xff, 0xfe]).unwrap();
        let ffi = FfiOrchestrateSettings {
            address: address.as_ptr(),
            ..settings.ffi()
        };
        let mut code = FfiErrorCode::Ok;
        let client = orchestrate_client_new(&ffi, &mut code);
        assert!(client.is_null());
        assert_eq!(code, FfiErrorCode::InvalidConfig);
    }

    #[test]
    fn client_new_null_strings_read_as_empty() {
        let settings = FfiOrchestrateSettings {
            address: std::ptr::null(),
            backend: FfiBackendType::Https as u32,
            front: std::ptr::null(),
            socks_config: std::ptr::null(),
            timeout_secs: 0,
        };
        let mut code = FfiErrorCode::Panic;
        let client = orchestrate_client_new(&settings, &mut code);
        assert_eq!(code, FfiErrorCode::Ok);

        // The empty address surfaces once a request is built.
        let result = build_with_no_filters(client);
        let (code, message) = build_error(result);
        assert_eq!(code, FfiErrorCode::MissingAddress);
        assert!(message.contains("address"));

        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn client_new_accepts_null_error_out() {
        let settings = Settings::new("a.example", FfiBackendType::Http, "", "");
        let client = orchestrate_client_new(&settings.ffi(), std::ptr::null_mut());
        assert!(!client.is_null());
        orchestrate_client_free(client);
    }

    #[test]
    fn client_free_null_is_safe() {
        orchestrate_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_https_request_with_filters() {
        let settings = Settings::new("orchestrate.example.org", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let country = CString::new("IT").unwrap();
        let humr = CString::new("HUMR").unwrap();
        let env = CString::new("ENV").unwrap();
        let codes = [humr.as_ptr(), env.as_ptr()];

        let result = orchestrate_build_urls_request(client, country.as_ptr(), codes.as_ptr(), 2, 10);
        let r = request_of(result);
        assert_eq!(
            c_str(r.url),
            "https://orchestrate.example.org/api/v1/urls?category_codes=HUMR,ENV&country_code=IT&limit=10"
        );
        assert!(r.proxy.is_null());
        assert_eq!(r.headers_len, 0);
        assert!(r.headers.is_null());
        assert_eq!(r.timeout_secs, 5);

        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn build_domain_fronted_request_sets_host_header() {
        let settings = Settings::new(
            "d36jct0wniod5z.cloudfront.net",
            FfiBackendType::DomainFronted,
            "a0.awsstatic.com",
            "",
        );
        let client = new_client(&settings);
        let result = build_with_no_filters(client);

        let r = request_of(result);
        assert_eq!(c_str(r.url), "https://a0.awsstatic.com/api/v1/urls");
        assert_eq!(r.headers_len, 1);
        let headers = unsafe { std::slice::from_raw_parts(r.headers, r.headers_len as usize) };
        assert_eq!(c_str(headers[0].key), "Host");
        assert_eq!(c_str(headers[0].value), "d36jct0wniod5z.cloudfront.net");

        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn build_onion_request_sets_proxy() {
        let settings = Settings::new(
            "65as4puv7ecde5q2.onion",
            FfiBackendType::Onion,
            "",
            "socks5h://127.0.0.1:9050",
        );
        let client = new_client(&settings);
        let result = build_with_no_filters(client);

        let r = request_of(result);
        assert_eq!(c_str(r.url), "http://65as4puv7ecde5q2.onion/api/v1/urls");
        assert_eq!(c_str(r.proxy), "socks5h://127.0.0.1:9050");

        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn build_reports_configuration_errors() {
        let fronted = Settings::new("d36jct0wniod5z.cloudfront.net", FfiBackendType::DomainFronted, "", "");
        let onion = Settings::new("65as4puv7ecde5q2.onion", FfiBackendType::Onion, "", "");

        for (settings, expected, needle) in [
            (&fronted, FfiErrorCode::MissingFront, "front"),
            (&onion, FfiErrorCode::MissingProxy, "proxy"),
        ] {
            let client = new_client(settings);
            let result = build_with_no_filters(client);
            let (code, message) = build_error(result);
            assert_eq!(code, expected);
            assert!(message.contains(needle), "{message}");
            orchestrate_free_request_result(result);
            orchestrate_client_free(client);
        }
    }

    #[test]
    fn build_null_client_is_invalid_argument() {
        let result = build_with_no_filters(std::ptr::null());
        let (code, message) = build_error(result);
        assert_eq!(code, FfiErrorCode::InvalidArgument);
        assert!(message.contains("client"));
        orchestrate_free_request_result(result);
    }

    #[test]
    fn build_null_category_array_with_length_is_invalid_argument() {
        let settings = Settings::new("a.example", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let result = orchestrate_build_urls_request(client, std::ptr::null(), std::ptr::null(), 3, 0);
        let (code, message) = build_error(result);
        assert_eq!(code, FfiErrorCode::InvalidArgument);
        assert!(message.contains("category_codes"));
        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn build_rejects_comma_in_category_code() {
        let settings = Settings::new("a.example", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let bad = CString::new("HUMR,ENV").unwrap();
        let codes = [bad.as_ptr()];
        let result = orchestrate_build_urls_request(client, std::ptr::null(), codes.as_ptr(), 1, 0);
        let (code, _) = build_error(result);
        assert_eq!(code, FfiErrorCode::InvalidArgument);
        orchestrate_free_request_result(result);
        orchestrate_client_free(client);
    }

    #[test]
    fn non_utf8_country_code_is_rejected_not_dropped() {
        let settings = Settings::new("orchestrate.example.org", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let country = CString::new(vec![0xff, 0xfe]).unwrap();

        let result = orchestrate_build_urls_request(client, country.as_ptr(), std::ptr::null(), 0, 0);
        let (code, message) = build_error(result);
        assert_eq!(code, FfiErrorCode::InvalidArgument);
        assert!(message.contains("country_code"));
        orchestrate_free_request_result(result);

        // Rejected before any network access.
        let result = orchestrate_get_urls(client, country.as_ptr(), std::ptr::null(), 0, 0);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidArgument);
        assert!(r.urls.is_null());
        orchestrate_free_result(result);

        orchestrate_client_free(client);
    }

    /// Build a request, then parse `body` with `status` as its response.
    fn parse(
        status: u16,
        body: &[u8],
    ) -> (*mut FfiOrchestrateClient, *mut FfiRequestResult, *mut FfiUrlsResult) {
        let settings = Settings::new("orchestrate.example.org", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let built = build_with_no_filters(client);
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
            body_len: body.len(),
        };
        let result = orchestrate_parse_urls(client, request_of(built), &resp);
        assert!(!result.is_null());
        (client, built, result)
    }

    fn release(client: *mut FfiOrchestrateClient, built: *mut FfiRequestResult, result: *mut FfiUrlsResult) {
        orchestrate_free_result(result);
        orchestrate_free_request_result(built);
        orchestrate_client_free(client);
    }

    #[test]
    fn parse_two_urls_in_order() {
        let (client, built, result) = parse(200, br#"{"results":[{"url":"https://a"},{"url":"https://b"}]}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.urls_len, 2);

        let urls = unsafe { std::slice::from_raw_parts(r.urls, r.urls_len as usize) };
        assert_eq!(c_str(urls[0]), "https://a");
        assert_eq!(c_str(urls[1]), "https://b");

        release(client, built, result);
    }

    #[test]
    fn parse_empty_results() {
        let (client, built, result) = parse(200, br#"{"results":[]}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.urls_len, 0);
        assert!(r.urls.is_null());
        release(client, built, result);
    }

    #[test]
    fn parse_malformed_json() {
        let (client, built, result) = parse(200, b"{");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::MalformedResponse);
        assert!(!r.error_message.is_null());
        assert!(r.urls.is_null());
        release(client, built, result);
    }

    #[test]
    fn parse_unexpected_schema() {
        let (client, built, result) = parse(200, br#"{"results":[{"noturl":"x"}]}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::UnexpectedSchema);
        release(client, built, result);
    }

    #[test]
    fn parse_error_status_reports_http_status() {
        let (client, built, result) = parse(502, b"bad gateway");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert_eq!(r.http_status, 502);
        assert!(c_str(r.error_message).contains("502"));
        release(client, built, result);
    }

    #[test]
    fn parse_url_with_nul_byte_is_rejected() {
        let (client, built, result) = parse(200, br#"{"results":[{"url":"https://a\u0000b"}]}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::UnexpectedSchema);
        assert!(r.urls.is_null());
        release(client, built, result);
    }

    #[test]
    fn error_message_keeps_text_around_nul_bytes() {
        // A 5xx body echoing a NUL ends up in the status error message.
        let (client, built, result) = parse(500, b"before\0after");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        let message = c_str(r.error_message);
        assert!(message.contains("before\u{FFFD}after"), "{message}");
        release(client, built, result);
    }

    #[test]
    fn parse_null_arguments() {
        let settings = Settings::new("a.example", FfiBackendType::Https, "", "");
        let client = new_client(&settings);
        let built = build_with_no_filters(client);
        let req = request_of(built) as *const FfiHttpRequest;
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
            body_len: 0,
        };

        for result in [
            orchestrate_parse_urls(std::ptr::null(), req, &resp),
            orchestrate_parse_urls(client, std::ptr::null(), &resp),
            orchestrate_parse_urls(client, req, std::ptr::null()),
        ] {
            let r = unsafe { &*result };
            assert_eq!(r.error_code, FfiErrorCode::InvalidArgument);
            orchestrate_free_result(result);
        }

        // Null body with a non-zero length is unusable.
        let bad = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
            body_len: 4,
        };
        let result = orchestrate_parse_urls(client, req, &bad);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidArgument);
        orchestrate_free_result(result);

        orchestrate_free_request_result(built);
        orchestrate_client_free(client);
    }

    #[test]
    fn get_urls_null_client() {
        let result = orchestrate_get_urls(std::ptr::null(), std::ptr::null(), std::ptr::null(), 0, 0);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidArgument);
        orchestrate_free_result(result);
    }

    #[test]
    fn get_urls_configuration_error_before_network() {
        let settings = Settings::new("65as4puv7ecde5q2.onion", FfiBackendType::Onion, "", "");
        let client = new_client(&settings);
        let result = orchestrate_get_urls(client, std::ptr::null(), std::ptr::null(), 0, 0);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::MissingProxy);
        orchestrate_free_result(result);
        orchestrate_client_free(client);
    }

    fn start_mock_server() -> std::net::SocketAddr {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        addr
    }

    #[test]
    fn get_urls_against_mock_server() {
        let addr = start_mock_server();
        let settings = Settings::new(&addr.to_string(), FfiBackendType::Http, "", "");
        let client = new_client(&settings);

        let result = orchestrate_get_urls(client, std::ptr::null(), std::ptr::null(), 0, 2);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.urls_len, 2);
        let urls = unsafe { std::slice::from_raw_parts(r.urls, r.urls_len as usize) };
        let catalogue = mock_server::default_catalogue();
        assert_eq!(c_str(urls[0]), catalogue[0].url);
        assert_eq!(c_str(urls[1]), catalogue[1].url);
        orchestrate_free_result(result);

        // The mock server rejects three-letter country codes.
        let country = CString::new("ITA").unwrap();
        let result = orchestrate_get_urls(client, country.as_ptr(), std::ptr::null(), 0, 0);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert_eq!(r.http_status, 400);
        assert!(r.urls.is_null());
        orchestrate_free_result(result);

        orchestrate_client_free(client);
    }

    #[test]
    fn free_request_result_null_is_safe() {
        orchestrate_free_request_result(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        orchestrate_free_result(std::ptr::null_mut());
    }
}
