//! Blocking client core for importing app packages into an engine.
//!
//! # Overview
//! Uploads one local package to `POST /v1/apps/import` and extracts the
//! imported app's `id` and `name` from the `{"attributes": {...}}` response.
//!
//! # Design
//! - `ImportClient` is stateless; it holds only the engine URL.
//! - Request building (`build_import_app`) and response parsing
//!   (`parse_import_app`) are pure, so hosts can drive the I/O themselves.
//! - `import_app` composes them around an injected `Transport`; production
//!   code uses `UreqTransport`, tests use spies.
//! - Only status 200 is accepted. Missing attributes render as
//!   `NIL_SENTINEL` rather than failing.

pub mod client;
pub mod error;
pub mod http;
pub mod rest;
pub mod tls;
pub mod transport;
pub mod types;

pub use client::{import_app, ImportClient, IMPORT_ACCEPTED, IMPORT_PATH, PACKAGE_CONTENT_TYPE};
pub use error::{CallError, ImportError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rest::AcceptedStatus;
pub use tls::{RootTrust, TlsPolicy};
pub use transport::{Transport, UreqTransport};
pub use types::{ImportedApp, ImportedAppInfo, NIL_SENTINEL};
