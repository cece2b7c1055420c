//! C-ABI wrapper around `app-import-core`.
//!
//! # Overview
//! Exposes the app import through `extern "C"` functions. Hosts can either
//! let this library do the upload (`app_import_import_app`) or do the I/O
//! themselves with `app_import_build_request` / `app_import_parse_response`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiImportResult` envelope conveys ids and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `app_import_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use app_import_core::{HttpResponse, ImportClient, TlsPolicy, UreqTransport};
use url::Url;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `ImportClient` bound to `engine_url`.
///
/// Returns null if `engine_url` is null, is not a valid absolute URL, or if
/// an internal panic occurs. Free with `app_import_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_client_new(engine_url: *const c_char) -> *mut FfiImportClient {
    catch_unwind(|| {
        if engine_url.is_null() {
            return std::ptr::null_mut();
        }
        let raw = unsafe { CStr::from_ptr(engine_url) }.to_str().unwrap_or("");
        let engine = match Url::parse(raw) {
            Ok(u) => u,
            Err(_) => return std::ptr::null_mut(),
        };
        Box::into_raw(Box::new(FfiImportClient {
            inner: ImportClient::new(engine),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `app_import_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_client_free(client: *mut FfiImportClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Host-does-IO: build request, parse response
// ---------------------------------------------------------------------------

/// Build the import request (URL and headers) for the host to execute.
///
/// `headers` may be null when `headers_len` is 0. Returns null if `client` is
/// null or any header key/value is null or not UTF-8.
/// Free with `app_import_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_build_request(
    client: *const FfiImportClient,
    headers: *const FfiHeader,
    headers_len: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let headers = match read_headers(headers, headers_len) {
            Some(h) => h,
            None => return std::ptr::null_mut(),
        };
        let req = client.inner.build_import_app(std::io::empty(), &headers);
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        Vec::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_bytes().to_vec()
    };
    HttpResponse::new(resp.status, body)
}

/// Parse the engine's response to an import request.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_parse_response(
    client: *const FfiImportClient,
    response: *const FfiHttpResponse,
) -> *mut FfiImportResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiImportResult::null_arg("client");
        }
        if response.is_null() {
            return FfiImportResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_import_app(&ffi_response_to_core(resp)) {
            Ok(info) => FfiImportResult::ok(info),
            Err(e) => FfiImportResult::from_call_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiImportResult::panic("panic in app_import_parse_response"))
}

// ---------------------------------------------------------------------------
// Full import
// ---------------------------------------------------------------------------

/// Upload the package at `app_path` and return the imported app's ids.
///
/// `insecure` disables certificate verification. `root_pem`, when not null,
/// is a NUL-terminated PEM bundle trusted instead of the bundled WebPKI
/// roots. `timeout_ms` of 0 means no deadline.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_import_app(
    client: *const FfiImportClient,
    app_path: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
    insecure: bool,
    root_pem: *const c_char,
    timeout_ms: u64,
) -> *mut FfiImportResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiImportResult::null_arg("client");
        }
        if app_path.is_null() {
            return FfiImportResult::null_arg("app_path");
        }
        let client = unsafe { &*client };
        let path = match unsafe { CStr::from_ptr(app_path) }.to_str() {
            Ok(p) => p,
            Err(_) => return FfiImportResult::invalid_arg("app_path is not valid UTF-8"),
        };
        let headers = match read_headers(headers, headers_len) {
            Some(h) => h,
            None => return FfiImportResult::invalid_arg("header key or value is null or not UTF-8"),
        };

        let transport = if timeout_ms == 0 {
            UreqTransport::new()
        } else {
            UreqTransport::with_timeout(Duration::from_millis(timeout_ms))
        };
        let policy = if root_pem.is_null() {
            insecure.then(TlsPolicy::insecure)
        } else {
            let pem = unsafe { CStr::from_ptr(root_pem) }.to_bytes();
            Some(TlsPolicy::default().with_root_pem(pem).verify_certificates(!insecure))
        };

        match app_import_core::import_app(
            &transport,
            path,
            client.inner.engine(),
            &headers,
            policy.as_ref(),
        ) {
            Ok(info) => FfiImportResult::ok(info),
            Err(e) => FfiImportResult::from_import_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiImportResult::panic("panic in app_import_import_app"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `app_import_build_request`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free a result returned by `app_import_parse_response` or
/// `app_import_import_app`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_free_result(result: *mut FfiImportResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        for s in [result.error_message, result.app_id, result.app_name] {
            if !s.is_null() {
                drop(unsafe { CString::from_raw(s) });
            }
        }
    });
}

/// Free a C string detached from a result. A host that keeps `app_id` or
/// `app_name` past `app_import_free_result` sets the field to null and frees
/// the string here later. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn app_import_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
