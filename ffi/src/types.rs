//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer plus length instead of `Vec`,
//! and enums with explicit discriminants. Conversions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use app_import_core::{CallError, HttpMethod, ImportError, ImportedAppInfo};

/// Opaque handle to an `ImportClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiImportClient {
    pub(crate) inner: app_import_core::ImportClient,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
///
/// Used both for caller-supplied headers (read, never freed by us) and for
/// headers inside an `FfiHttpRequest` (owned by the request).
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The import request as C-compatible plain data.
///
/// The body is not included: the host streams the package file itself with
/// the returned URL and headers, then hands the response to
/// `app_import_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`,
    /// dropping its body.
    pub(crate) fn from_core<B>(req: app_import_core::HttpRequest<B>) -> *mut Self {
        let url = CString::new(req.url.as_str()).unwrap_or_default().into_raw();

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: CString::new(k).unwrap_or_default().into_raw(),
                    value: CString::new(v).unwrap_or_default().into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
        }))
    }
}

/// Read a caller-owned header array. Returns `None` if any key or value is
/// null or not UTF-8. `headers` may be null when `len` is zero; otherwise it
/// must point to `len` headers with NUL-terminated strings.
pub(crate) fn read_headers(headers: *const FfiHeader, len: u32) -> Option<Vec<(String, String)>> {
    if headers.is_null() || len == 0 {
        return Some(Vec::new());
    }
    let slice = unsafe { std::slice::from_raw_parts(headers, len as usize) };
    slice
        .iter()
        .map(|h| {
            if h.key.is_null() || h.value.is_null() {
                return None;
            }
            let key = unsafe { CStr::from_ptr(h.key) }.to_str().ok()?;
            let value = unsafe { CStr::from_ptr(h.value) }.to_str().ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing the request,
/// then passes a pointer to `app_import_parse_response`. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiImportResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    FileAccess = 1,
    Transport = 2,
    UnacceptedStatus = 3,
    Decode = 4,
    InvalidArg = 5,
    Panic = 6,
    NullArg = 7,
}

/// Result envelope for parse and import operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `app_id` /
/// `app_name` are set. On failure `error_code` describes the category,
/// `error_message` is a human-readable C string, and both ids are null.
#[repr(C)]
pub struct FfiImportResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub app_id: *mut c_char,
    pub app_name: *mut c_char,
}

impl FfiImportResult {
    pub(crate) fn ok(info: ImportedAppInfo) -> *mut Self {
        Box::into_raw(Box::new(FfiImportResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 200,
            app_id: CString::new(info.id).unwrap_or_default().into_raw(),
            app_name: CString::new(info.name).unwrap_or_default().into_raw(),
        }))
    }

    pub(crate) fn from_call_error(err: &CallError) -> *mut Self {
        let (error_code, http_status) = classify(err);
        Self::error(error_code, http_status, &err.to_string())
    }

    /// Like `from_call_error`, but the message keeps the outer import context.
    pub(crate) fn from_import_error(err: &ImportError) -> *mut Self {
        let (error_code, http_status) = match err {
            ImportError::FileAccess { .. } => (FfiErrorCode::FileAccess, 0),
            ImportError::Import(cause) => classify(cause),
        };
        Self::error(error_code, http_status, &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_arg(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArg, 0, msg)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg)
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiImportResult {
            error_code,
            error_message: CString::new(msg).unwrap_or_default().into_raw(),
            http_status,
            app_id: std::ptr::null_mut(),
            app_name: std::ptr::null_mut(),
        }))
    }
}

fn classify(err: &CallError) -> (FfiErrorCode, u16) {
    match err {
        CallError::Transport(_) => (FfiErrorCode::Transport, 0),
        CallError::UnacceptedStatus { status, .. } => (FfiErrorCode::UnacceptedStatus, *status),
        CallError::Decode(_) => (FfiErrorCode::Decode, 200),
    }
}
