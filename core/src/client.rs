//! Request builder and response parser for the engine's import endpoint.
//!
//! # Design
//! `ImportClient` holds only the engine URL and carries no mutable state
//! between calls. `build_import_app` produces an `HttpRequest` around a body
//! stream and `parse_import_app` consumes an `HttpResponse`, so hosts that do
//! their own I/O can use the pair directly. `import_app` composes the two
//! around an injected `Transport`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{CallError, ImportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::rest::{self, AcceptedStatus};
use crate::tls::TlsPolicy;
use crate::transport::Transport;
use crate::types::{ImportedApp, ImportedAppInfo};

pub const IMPORT_PATH: &str = "/v1/apps/import";
pub const PACKAGE_CONTENT_TYPE: &str = "binary/octet-stream";

/// Statuses the import endpoint may answer with on success.
pub const IMPORT_ACCEPTED: AcceptedStatus = AcceptedStatus::new(&[200]);

#[derive(Debug, Clone)]
pub struct ImportClient {
    engine: Url,
}

impl ImportClient {
    pub fn new(engine: Url) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Url {
        &self.engine
    }

    /// The engine URL with its path replaced by [`IMPORT_PATH`] and its query
    /// rebuilt from an empty parameter list. Whatever path or query the engine
    /// URL had is discarded.
    pub fn import_url(&self) -> Url {
        let mut url = self.engine.clone();
        url.set_path(IMPORT_PATH);
        let query = url::form_urlencoded::Serializer::new(String::new()).finish();
        url.set_query(if query.is_empty() { None } else { Some(query.as_str()) });
        url
    }

    /// Build the import request. `headers` is copied; the returned request
    /// carries exactly one `Content-Type`, set to [`PACKAGE_CONTENT_TYPE`].
    pub fn build_import_app<B: Read>(&self, body: B, headers: &[(String, String)]) -> HttpRequest<B> {
        let mut headers: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
            .cloned()
            .collect();
        headers.push(("Content-Type".to_string(), PACKAGE_CONTENT_TYPE.to_string()));

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.import_url(),
            headers,
            body,
        };
        debug!(url = %request.url, headers = request.headers.len(), "built import request");
        request
    }

    pub fn parse_import_app(&self, response: &HttpResponse) -> Result<ImportedAppInfo, CallError> {
        let app = rest::decode_accepted(response, &IMPORT_ACCEPTED, ImportedApp::from_slice)?;
        Ok(app.info())
    }

    /// Send `body` as the package and return the imported app's identifiers.
    pub fn import_body<T: Transport, B: Read>(
        &self,
        transport: &T,
        body: B,
        headers: &[(String, String)],
        tls: Option<&TlsPolicy>,
    ) -> Result<ImportedAppInfo, CallError> {
        let request = self.build_import_app(body, headers);
        let app = rest::call(transport, request, tls, &IMPORT_ACCEPTED, ImportedApp::from_slice)?;
        Ok(app.info())
    }
}

/// Import the package at `app_path` into `engine`.
///
/// The file is opened before anything is sent; if that fails the transport
/// is never invoked. The open handle is moved into the request and released
/// when the transport consumes it.
#[instrument(skip_all, fields(path = %app_path.as_ref().display(), engine = %engine))]
pub fn import_app<T: Transport>(
    transport: &T,
    app_path: impl AsRef<Path>,
    engine: &Url,
    headers: &[(String, String)],
    tls: Option<&TlsPolicy>,
) -> Result<ImportedAppInfo, ImportError> {
    let app_path = app_path.as_ref();
    let file = File::open(app_path).map_err(|source| ImportError::FileAccess {
        path: app_path.to_path_buf(),
        source,
    })?;

    let info = ImportClient::new(engine.clone())
        .import_body(transport, file, headers, tls)
        .map_err(ImportError::Import)?;
    info!(app_id = %info.id, app_name = %info.name, "app imported");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NIL_SENTINEL;

    fn client() -> ImportClient {
        ImportClient::new("https://engine.local:4242".parse().unwrap())
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse::new(200, body)
    }

    #[test]
    fn import_url_has_fixed_path_and_empty_query() {
        let url = client().import_url();
        assert_eq!(url.as_str(), "https://engine.local:4242/v1/apps/import");
        assert_eq!(url.path(), IMPORT_PATH);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn engine_path_and_query_are_overwritten() {
        let client = ImportClient::new("http://engine.local/api/v9?ticket=abc".parse().unwrap());
        let url = client.import_url();
        assert_eq!(url.path(), "/v1/apps/import");
        assert_eq!(url.query(), None);
        assert_eq!(url.host_str(), Some("engine.local"));
    }

    #[test]
    fn build_sets_method_and_content_type() {
        let req = client().build_import_app(&b"qvf"[..], &[]);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), PACKAGE_CONTENT_TYPE.to_string())]
        );
    }

    #[test]
    fn build_keeps_caller_headers_and_replaces_content_type() {
        let caller = vec![
            ("Authorization".to_string(), "Bearer t0k3n".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        let req = client().build_import_app(&b"qvf"[..], &caller);
        assert_eq!(req.header("authorization"), Some("Bearer t0k3n"));
        assert_eq!(req.header("Content-Type"), Some(PACKAGE_CONTENT_TYPE));
        let content_types = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .count();
        assert_eq!(content_types, 1);
        // the caller's collection is untouched
        assert_eq!(caller.len(), 2);
        assert_eq!(caller[1].1, "application/json");
    }

    #[test]
    fn parse_success_returns_id_and_name() {
        let info = client()
            .parse_import_app(&ok(r#"{"attributes":{"id":"X","name":"Y"}}"#))
            .unwrap();
        assert_eq!(info.id, "X");
        assert_eq!(info.name, "Y");
    }

    #[test]
    fn parse_missing_name_is_lenient() {
        let info = client()
            .parse_import_app(&ok(r#"{"attributes":{"id":"abc"}}"#))
            .unwrap();
        assert_eq!(info.id, "abc");
        assert_eq!(info.name, NIL_SENTINEL);
    }

    #[test]
    fn parse_numeric_id_is_stringified() {
        let info = client()
            .parse_import_app(&ok(r#"{"attributes":{"id":17,"name":true}}"#))
            .unwrap();
        assert_eq!(info.id, "17");
        assert_eq!(info.name, "true");
    }

    #[test]
    fn parse_null_attributes_and_null_body_are_lenient() {
        for body in [r#"{"attributes":null}"#, "null"] {
            let info = client().parse_import_app(&ok(body)).unwrap();
            assert_eq!(info.id, "<nil>", "{body}");
            assert_eq!(info.name, "<nil>", "{body}");
        }
    }

    #[test]
    fn parse_not_found() {
        let response = HttpResponse::new(404, r#"{"attributes":{"id":"X","name":"Y"}}"#);
        let err = client().parse_import_app(&response).unwrap_err();
        assert!(matches!(err, CallError::UnacceptedStatus { status: 404, .. }));
    }

    #[test]
    fn parse_server_error() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_import_app(&response).unwrap_err();
        assert!(matches!(err, CallError::UnacceptedStatus { status: 500, .. }));
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_import_app(&ok("not json")).unwrap_err();
        assert!(matches!(err, CallError::Decode(_)));
    }
}
