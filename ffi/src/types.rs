//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! plain integers where C could pass any value. Conversion functions live
//! here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::time::Duration;

use orchestrate_core::{BackendType, ClientError, ConfigError, OrchestrateSettings, RequestDescription};

/// Opaque handle to an `OrchestrateClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiOrchestrateClient {
    pub(crate) inner: orchestrate_core::OrchestrateClient,
}

// ---------------------------------------------------------------------------
// Settings (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// Backend discriminants accepted in `FfiOrchestrateSettings::backend`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiBackendType {
    Http = 0,
    Https = 1,
    Onion = 2,
    DomainFronted = 3,
}

/// Client settings as C-compatible plain data.
///
/// `backend` is a raw integer so that out-of-range values from C are
/// reported as `UnknownBackend` instead of being undefined behaviour.
/// Null strings are treated as empty. `timeout_secs == 0` means no deadline.
#[repr(C)]
pub struct FfiOrchestrateSettings {
    pub address: *const c_char,
    pub backend: u32,
    pub front: *const c_char,
    pub socks_config: *const c_char,
    pub timeout_secs: u64,
}

pub(crate) fn backend_from_raw(raw: u32) -> Result<BackendType, ConfigError> {
    match raw {
        x if x == FfiBackendType::Http as u32 => Ok(BackendType::Http),
        x if x == FfiBackendType::Https as u32 => Ok(BackendType::Https),
        x if x == FfiBackendType::Onion as u32 => Ok(BackendType::Onion),
        x if x == FfiBackendType::DomainFronted as u32 => Ok(BackendType::DomainFronted),
        other => Err(ConfigError::UnknownBackend(other.to_string())),
    }
}

/// Read a caller-owned C string. Null and invalid UTF-8 read as `None`.
pub(crate) fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_string)
}

/// Read an optional C string: null reads as empty, invalid UTF-8 as `None`.
pub(crate) fn read_optional_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return Some(String::new());
    }
    read_c_str(ptr)
}

fn settings_field(ptr: *const c_char, name: &str) -> Result<String, ConfigError> {
    read_optional_c_str(ptr).ok_or_else(|| ConfigError::Invalid(format!("{name} is not valid UTF-8")))
}

impl FfiOrchestrateSettings {
    pub(crate) fn to_core(&self) -> Result<OrchestrateSettings, ConfigError> {
        Ok(OrchestrateSettings {
            address: settings_field(self.address, "address")?,
            backend: backend_from_raw(self.backend)?,
            front: settings_field(self.front, "front")?,
            socks_config: settings_field(self.socks_config, "socks_config")?,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        })
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A GET request described as C-compatible plain data.
///
/// Built by `orchestrate_build_urls_request`. The C caller connects to the
/// host in `url` (through `proxy` when non-null), sends every header in
/// `headers` verbatim (including `Host`), and passes the response back
/// through `orchestrate_parse_urls`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub proxy: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub timeout_secs: u64,
}

/// Interior NULs become U+FFFD so the rest of the text survives.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "\u{FFFD}") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiHttpRequest {
    /// Convert a core `RequestDescription` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: RequestDescription) -> *mut Self {
        let url = into_c_string(req.url);
        let proxy = match req.proxy {
            Some(p) => into_c_string(p),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            url,
            proxy,
            headers,
            headers_len,
            timeout_secs: req.timeout.map_or(0, |t| t.as_secs()),
        }))
    }
}

/// Result envelope for `orchestrate_build_urls_request`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the built request. On failure `request` is null and
/// `error_message` explains why. The envelope owns `request`; free both with
/// `orchestrate_free_request_result`.
#[repr(C)]
pub struct FfiRequestResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiRequestResult {
    pub(crate) fn ok(req: RequestDescription) -> *mut Self {
        Box::into_raw(Box::new(FfiRequestResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiHttpRequest::from_core(req),
        }))
    }

    pub(crate) fn from_error(err: ClientError) -> *mut Self {
        Self::error(FfiErrorCode::from(&err), err.to_string())
    }

    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArgument, format!("invalid argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }

    fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiRequestResult {
            error_code,
            error_message: into_c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller fills this in after executing an `FfiHttpRequest`. The body
/// is raw bytes and need not be NUL-terminated. The FFI layer reads but does
/// not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

impl FfiHttpResponse {
    /// Copy the body out. `None` if `body` is null while `body_len > 0`.
    pub(crate) fn body(&self) -> Option<Vec<u8>> {
        if self.body.is_null() {
            return (self.body_len == 0).then(Vec::new);
        }
        Some(unsafe { std::slice::from_raw_parts(self.body, self.body_len) }.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiUrlsResult` and by `orchestrate_client_new`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    MissingAddress = 2,
    MissingFront = 3,
    MissingProxy = 4,
    UnknownBackend = 5,
    InvalidConfig = 6,
    Transport = 7,
    MalformedResponse = 8,
    UnexpectedSchema = 9,
    Panic = 10,
}

impl From<&ConfigError> for FfiErrorCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::MissingAddress => FfiErrorCode::MissingAddress,
            ConfigError::MissingFront => FfiErrorCode::MissingFront,
            ConfigError::MissingProxy => FfiErrorCode::MissingProxy,
            ConfigError::UnknownBackend(_) => FfiErrorCode::UnknownBackend,
            ConfigError::Invalid(_) => FfiErrorCode::InvalidConfig,
        }
    }
}

impl From<&ClientError> for FfiErrorCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            ClientError::Configuration(config) => config.into(),
            ClientError::Transport { .. } => FfiErrorCode::Transport,
            ClientError::MalformedResponse { .. } => FfiErrorCode::MalformedResponse,
            ClientError::UnexpectedSchema { .. } => FfiErrorCode::UnexpectedSchema,
        }
    }
}

/// Result envelope for operations that yield URLs.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `urls`
/// points to `urls_len` C strings in service order (null when empty).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is set when the service answered,
/// and `urls` is null.
#[repr(C)]
pub struct FfiUrlsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub urls: *mut *mut c_char,
    pub urls_len: u32,
}

impl FfiUrlsResult {
    /// Build a success result carrying `urls`.
    pub(crate) fn ok_urls(urls: Vec<String>) -> *mut Self {
        let c_urls = match urls.into_iter().map(CString::new).collect::<Result<Vec<_>, _>>() {
            Ok(c_urls) => c_urls,
            Err(_) => {
                return Self::error(
                    FfiErrorCode::UnexpectedSchema,
                    0,
                    "url contains a NUL byte".to_string(),
                )
            }
        };

        let urls_len = c_urls.len() as u32;
        let urls = if c_urls.is_empty() {
            std::ptr::null_mut()
        } else {
            let raw: Box<[*mut c_char]> = c_urls.into_iter().map(CString::into_raw).collect();
            Box::into_raw(raw) as *mut *mut c_char
        };

        Box::into_raw(Box::new(FfiUrlsResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            urls,
            urls_len,
        }))
    }

    /// Build an error result from a `ClientError`.
    pub(crate) fn from_error(err: ClientError) -> *mut Self {
        let status = err.http_status().unwrap_or(0);
        Self::error(FfiErrorCode::from(&err), status, err.to_string())
    }

    /// Build an error result for a null or unusable argument.
    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArgument, 0, format!("invalid argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiUrlsResult {
            error_code,
            error_message: into_c_string(msg),
            http_status,
            urls: std::ptr::null_mut(),
            urls_len: 0,
        }))
    }
}
