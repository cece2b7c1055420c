//! Error types for the import client.
//!
//! # Design
//! `ImportError` is what callers of `import_app` see. Failing to open the
//! package gets its own variant because it happens before any network I/O.
//! Everything after that point is a `CallError` wrapped in
//! `ImportError::Import`, so every failure carries one contextual prefix.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `import_app`.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The package file could not be opened. No request was sent.
    #[error("could not open file: {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The REST call failed after the package was opened.
    #[error("could not import app: {0}")]
    Import(#[source] CallError),
}

/// Errors produced by `rest::call` and `ImportClient::parse_import_app`.
#[derive(Debug, Error)]
pub enum CallError {
    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside the accepted set.
    #[error("unexpected status {status}: {body}")]
    UnacceptedStatus { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures raised by a `Transport` implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("tls configuration rejected: {0}")]
    Tls(String),

    #[error("i/o error while sending request: {0}")]
    Io(#[from] io::Error),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Io(e) => TransportError::Io(e),
            other => TransportError::Connection(other.to_string()),
        }
    }
}
