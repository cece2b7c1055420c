//! Generic REST call helper: send, check status, decode.

use std::io::Read;

use tracing::{instrument, warn};

use crate::error::CallError;
use crate::http::{HttpRequest, HttpResponse};
use crate::tls::TlsPolicy;
use crate::transport::Transport;

/// Status codes a call treats as success. Anything else fails, whatever the
/// body says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedStatus(&'static [u16]);

impl AcceptedStatus {
    pub const fn new(codes: &'static [u16]) -> Self {
        Self(codes)
    }

    pub fn contains(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    pub fn codes(&self) -> &'static [u16] {
        self.0
    }
}

/// Submit `request` over `transport`, then decode the body with `decode` if
/// the status is in `accepted`.
#[instrument(skip_all, fields(url = %request.url))]
pub fn call<Tr, B, T, D>(
    transport: &Tr,
    request: HttpRequest<B>,
    tls: Option<&TlsPolicy>,
    accepted: &AcceptedStatus,
    decode: D,
) -> Result<T, CallError>
where
    Tr: Transport,
    B: Read,
    D: FnOnce(&[u8]) -> Result<T, serde_json::Error>,
{
    let response = transport.send(request, tls)?;
    decode_accepted(&response, accepted, decode)
}

/// Status check plus decode, without any I/O.
pub fn decode_accepted<T, D>(
    response: &HttpResponse,
    accepted: &AcceptedStatus,
    decode: D,
) -> Result<T, CallError>
where
    D: FnOnce(&[u8]) -> Result<T, serde_json::Error>,
{
    check_status(response, accepted)?;
    Ok(decode(&response.body)?)
}

fn check_status(response: &HttpResponse, accepted: &AcceptedStatus) -> Result<(), CallError> {
    if accepted.contains(response.status) {
        return Ok(());
    }
    warn!(status = response.status, accepted = ?accepted.codes(), "unaccepted response status");
    Err(CallError::UnacceptedStatus {
        status: response.status,
        body: response.body_text(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;

    const OK_ONLY: AcceptedStatus = AcceptedStatus::new(&[200]);

    struct Canned {
        response: Option<HttpResponse>,
        calls: Cell<usize>,
    }

    impl Canned {
        fn new(response: Option<HttpResponse>) -> Self {
            Self {
                response,
                calls: Cell::new(0),
            }
        }
    }

    impl Transport for Canned {
        fn send<B: Read>(
            &self,
            _request: HttpRequest<B>,
            _tls: Option<&TlsPolicy>,
        ) -> Result<HttpResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            self.response
                .clone()
                .ok_or_else(|| TransportError::Connection("refused".to_string()))
        }
    }

    fn request() -> HttpRequest<&'static [u8]> {
        HttpRequest {
            method: HttpMethod::Post,
            url: "http://engine.local/v1/apps/import".parse().unwrap(),
            headers: Vec::new(),
            body: b"payload",
        }
    }

    #[test]
    fn accepted_status_decodes_body() {
        let transport = Canned::new(Some(HttpResponse::new(200, r#"{"n":1}"#)));
        let value: serde_json::Value =
            call(&transport, request(), None, &OK_ONLY, |body| serde_json::from_slice(body)).unwrap();
        assert_eq!(value["n"], 1);
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn other_2xx_is_still_rejected() {
        let transport = Canned::new(Some(HttpResponse::new(201, r#"{"n":1}"#)));
        let err = call::<_, _, serde_json::Value, _>(
            &transport,
            request(),
            None,
            &OK_ONLY,
            |body| serde_json::from_slice(body),
        )
        .unwrap_err();
        assert!(matches!(err, CallError::UnacceptedStatus { status: 201, .. }));
    }

    #[test]
    fn rejected_status_carries_body_text() {
        let response = HttpResponse::new(500, "engine exploded");
        let err = decode_accepted::<serde_json::Value, _>(&response, &OK_ONLY, |body| serde_json::from_slice(body))
            .unwrap_err();
        match err {
            CallError::UnacceptedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "engine exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let transport = Canned::new(None);
        let err = call::<_, _, serde_json::Value, _>(
            &transport,
            request(),
            None,
            &OK_ONLY,
            |body| serde_json::from_slice(body),
        )
        .unwrap_err();
        assert!(matches!(err, CallError::Transport(TransportError::Connection(_))));
    }

    #[test]
    fn multi_code_set() {
        let set = AcceptedStatus::new(&[200, 204]);
        assert!(set.contains(204));
        assert!(!set.contains(404));
    }
}
