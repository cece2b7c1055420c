//! HTTP transport types for the import exchange.
//!
//! # Design
//! Requests and responses are plain data. `ImportClient` builds an
//! `HttpRequest` and parses an `HttpResponse`; a `Transport` moves one into
//! the other. The request body is generic so the file handle can be moved
//! into the request and released exactly once, when the transport consumes
//! it.
//!
//! Headers are an ordered list of owned pairs so values can cross the FFI
//! boundary without lifetime concerns.

use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data plus a streaming body.
///
/// Built by `ImportClient::build_import_app`. Submitting it consumes the
/// request, which drops the body.
#[derive(Debug)]
pub struct HttpRequest<B> {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: B,
}

impl<B> HttpRequest<B> {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Returned by a `Transport` for every status code, including 4xx/5xx, so
/// status interpretation stays with the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
