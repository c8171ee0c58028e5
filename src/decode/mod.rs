//! Interpret file bytes as one of the supported container formats.
//!
//! Every decoder either returns fully decoded objects or fails; nothing
//! decoded from a container that later turns out to be malformed is kept.

use rustls_pki_types::CertificateDer;
use std::path::Path;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::error::{DecodeReason, ResourceError};

pub mod pem;
pub mod pkcs12;

/// Container formats the loader can read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// Binary PKCS#12 keystore, protected by a passphrase.
    Pkcs12,
    /// PEM text holding one or more X.509 certificates.
    PemCertificate,
    /// PEM text holding a private key.
    PemPrivateKey,
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pkcs12 => "PKCS#12 keystore",
            Self::PemCertificate => "PEM certificate",
            Self::PemPrivateKey => "PEM private key",
        })
    }
}

/// Check that every certificate is well-formed X.509.
///
/// Certificates outside their validity window are accepted with a warning;
/// judging validity belongs to whoever verifies chains.
pub(crate) fn check_certificates(
    path: &Path,
    format: ContainerFormat,
    certs: &[CertificateDer<'_>],
) -> Result<(), ResourceError> {
    for (i, der) in certs.iter().enumerate() {
        let (_, cert) = X509Certificate::from_der(der.as_ref()).map_err(|e| {
            ResourceError::decode(
                path,
                format,
                DecodeReason::Malformed(format!("certificate #{}: {}", i + 1, e)),
            )
        })?;
        if !cert.validity().is_valid() {
            log::warn!(
                "Certificate {} in {} is outside its validity period",
                cert.subject(),
                path.display()
            );
        }
    }
    Ok(())
}
