//! Caller-supplied TLS trust policy.
//!
//! The core never provisions certificates. It only carries what the caller
//! decided: which roots to trust and whether to verify at all. `UreqTransport`
//! turns the policy into a `ureq::tls::TlsConfig` per call.

use std::sync::Arc;

use ureq::tls::{Certificate, RootCerts, TlsConfig};

use crate::error::TransportError;

/// Which certificate authorities the transport trusts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootTrust {
    /// Bundled WebPKI roots.
    #[default]
    WebPki,
    /// Only the given PEM-encoded certificates.
    Pem(Vec<Vec<u8>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPolicy {
    pub verify_certificates: bool,
    pub roots: RootTrust,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            verify_certificates: true,
            roots: RootTrust::WebPki,
        }
    }
}

impl TlsPolicy {
    /// Accept any server certificate. Intended for self-signed dev engines.
    pub fn insecure() -> Self {
        Self {
            verify_certificates: false,
            roots: RootTrust::WebPki,
        }
    }

    /// Trust `pem` in addition to any PEM roots already added.
    pub fn with_root_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        match &mut self.roots {
            RootTrust::Pem(roots) => roots.push(pem.into()),
            RootTrust::WebPki => self.roots = RootTrust::Pem(vec![pem.into()]),
        }
        self
    }

    pub fn verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    pub(crate) fn to_ureq(&self) -> Result<TlsConfig, TransportError> {
        let builder = TlsConfig::builder().disable_verification(!self.verify_certificates);
        let builder = match &self.roots {
            RootTrust::WebPki => builder.root_certs(RootCerts::WebPki),
            RootTrust::Pem(pems) => {
                let certs = parse_roots(pems)?;
                builder.root_certs(RootCerts::Specific(Arc::new(certs)))
            }
        };
        Ok(builder.build())
    }
}

fn parse_roots(pems: &[Vec<u8>]) -> Result<Vec<Certificate<'static>>, TransportError> {
    if pems.is_empty() {
        return Err(TransportError::Tls("no root certificates supplied".to_string()));
    }
    pems.iter()
        .map(|pem| {
            Certificate::from_pem(pem)
                .map(|cert| cert.to_owned())
                .map_err(|e| TransportError::Tls(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_verifies_with_webpki_roots() {
        let policy = TlsPolicy::default();
        assert!(policy.verify_certificates);
        assert_eq!(policy.roots, RootTrust::WebPki);
        assert!(policy.to_ureq().is_ok());
    }

    #[test]
    fn insecure_disables_verification() {
        let policy = TlsPolicy::insecure();
        assert!(!policy.verify_certificates);
        assert!(policy.to_ureq().is_ok());
    }

    #[test]
    fn verify_certificates_toggles_verification_only() {
        let policy = TlsPolicy::default()
            .with_root_pem(b"pinned".to_vec())
            .verify_certificates(false);
        assert!(!policy.verify_certificates);
        assert_eq!(policy.roots, RootTrust::Pem(vec![b"pinned".to_vec()]));

        let policy = TlsPolicy::insecure().verify_certificates(true);
        assert_eq!(policy, TlsPolicy::default());
    }

    #[test]
    fn with_root_pem_accumulates() {
        let policy = TlsPolicy::default()
            .with_root_pem(b"first".to_vec())
            .with_root_pem(b"second".to_vec());
        assert_eq!(
            policy.roots,
            RootTrust::Pem(vec![b"first".to_vec(), b"second".to_vec()])
        );
    }

    #[test]
    fn garbage_pem_is_a_tls_error() {
        let policy = TlsPolicy::default().with_root_pem(b"not a certificate".to_vec());
        let err = policy.to_ureq().unwrap_err();
        assert!(matches!(err, TransportError::Tls(_)));
    }

    #[test]
    fn empty_pem_list_is_a_tls_error() {
        let policy = TlsPolicy {
            verify_certificates: true,
            roots: RootTrust::Pem(Vec::new()),
        };
        assert!(matches!(policy.to_ureq(), Err(TransportError::Tls(_))));
    }
}
