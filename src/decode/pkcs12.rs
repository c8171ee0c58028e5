//! PKCS#12 keystores and truststores.
//!
//! The container's MAC is verified with the store password before any bag
//! is decrypted, so a wrong password is reported as such rather than as
//! garbage. Only SHA-1 MACs and the legacy PBE schemes (3DES and RC2 with
//! SHA-1) can be checked and decrypted. Containers protected with anything
//! else, such as the SHA-256 MAC and PBES2/AES bags current OpenSSL and
//! keytool write by default, are rejected as an unsupported algorithm
//! before the password is tried.

use p12::{AlgorithmIdentifier, CertBag, ContentInfo, PFX, SafeBag, SafeBagKind};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::path::Path;

use super::{ContainerFormat, check_certificates};
use crate::error::{DecodeReason, ResourceError};

const JKS_MAGIC: [u8; 4] = [0xfe, 0xed, 0xfe, 0xed];
const KEY_BAG: [u64; 9] = [1, 2, 840, 113549, 1, 12, 10, 1, 1];

/// Keystore types accepted in `keystore.type` and `truststore.type`.
pub fn check_declared_type(path: &Path, declared: Option<&str>) -> Result<(), ResourceError> {
    match declared.map(|t| t.trim().to_ascii_lowercase()) {
        None => Ok(()),
        Some(t) if matches!(t.as_str(), "pkcs12" | "p12" | "pfx") => Ok(()),
        Some(t) => Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::UnsupportedFormat(format!("keystore type [{t}]")),
        )),
    }
}

/// Decoded contents of a keystore.
#[derive(Debug)]
pub struct Entries {
    /// PKCS#8 private keys, in container order.
    pub keys: Vec<PrivateKeyDer<'static>>,
    /// Certificates, in container order.
    pub certs: Vec<CertificateDer<'static>>,
}

fn malformed(path: &Path, detail: String) -> ResourceError {
    ResourceError::decode(path, ContainerFormat::Pkcs12, DecodeReason::Malformed(detail))
}

fn algorithm_name(algorithm: &AlgorithmIdentifier) -> String {
    match algorithm {
        AlgorithmIdentifier::Sha1 => "SHA-1".into(),
        AlgorithmIdentifier::PbewithSHAAnd40BitRC2CBC(_) => "pbeWithSHAAnd40BitRC2-CBC".into(),
        AlgorithmIdentifier::PbeWithSHAAnd3KeyTripleDESCBC(_) => {
            "pbeWithSHAAnd3-KeyTripleDES-CBC".into()
        }
        AlgorithmIdentifier::OtherAlg(other) => match other.algorithm_type.components().as_slice() {
            [1, 2, 840, 113549, 1, 5, 13] => "PBES2".into(),
            [2, 16, 840, 1, 101, 3, 4, 2, 1] => "SHA-256".into(),
            [2, 16, 840, 1, 101, 3, 4, 2, 2] => "SHA-384".into(),
            [2, 16, 840, 1, 101, 3, 4, 2, 3] => "SHA-512".into(),
            _ => other.algorithm_type.to_string(),
        },
    }
}

fn unsupported(path: &Path, algorithm: &AlgorithmIdentifier, usage: &str) -> ResourceError {
    ResourceError::decode(
        path,
        ContainerFormat::Pkcs12,
        DecodeReason::UnsupportedAlgorithm(format!("{} {usage}", algorithm_name(algorithm))),
    )
}

fn is_other(algorithm: &AlgorithmIdentifier) -> bool {
    matches!(algorithm, AlgorithmIdentifier::OtherAlg(_))
}

/// Password as a NUL-terminated big-endian BMPString, the form PKCS#12
/// key derivation takes.
fn bmp_password(password: &str) -> Vec<u8> {
    let mut bytes = password
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect::<Vec<_>>();
    bytes.extend([0, 0]);
    bytes
}

/// Check the container's protection and integrity, then return every safe
/// bag. Shrouded key bags are returned still encrypted.
fn open(path: &Path, contents: &[u8], password: &str) -> Result<Vec<SafeBag>, ResourceError> {
    if contents.starts_with(&JKS_MAGIC) {
        return Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::UnsupportedFormat("JKS keystore; convert it to PKCS#12".into()),
        ));
    }
    let pfx = PFX::parse(contents).map_err(|e| malformed(path, format!("{:?}", e)))?;
    let ContentInfo::Data(auth_safe) = &pfx.auth_safe else {
        return Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::UnsupportedFormat(format!(
                "public-key integrity mode ({})",
                pfx.auth_safe.oid()
            )),
        ));
    };
    if let Some(mac_data) = &pfx.mac_data {
        if mac_data.mac.digest_algorithm != AlgorithmIdentifier::Sha1 {
            return Err(unsupported(path, &mac_data.mac.digest_algorithm, "MAC"));
        }
    }
    if !pfx.verify_mac(password) {
        return Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::IncorrectPassword,
        ));
    }

    let password = bmp_password(password);
    let safes = yasna::parse_der(auth_safe, |r| r.collect_sequence_of(ContentInfo::parse))
        .map_err(|e| malformed(path, format!("{:?}", e)))?;
    let mut bags = Vec::new();
    for safe in &safes {
        let data = match safe {
            ContentInfo::Data(data) => data.clone(),
            ContentInfo::EncryptedData(encrypted) => {
                let algorithm = &encrypted.encrypted_content_info.content_encryption_algorithm;
                if is_other(algorithm) {
                    return Err(unsupported(path, algorithm, "encrypted safe contents"));
                }
                encrypted
                    .data(&password)
                    .ok_or_else(|| malformed(path, "safe contents could not be decrypted".into()))?
            }
            ContentInfo::OtherContext(other) => {
                return Err(ResourceError::decode(
                    path,
                    ContainerFormat::Pkcs12,
                    DecodeReason::UnsupportedFormat(format!(
                        "safe contents of type {}",
                        other.content_type
                    )),
                ));
            }
        };
        let parsed = yasna::parse_der(&data, |r| r.collect_sequence_of(SafeBag::parse))
            .map_err(|e| malformed(path, format!("{:?}", e)))?;
        bags.extend(parsed);
    }
    Ok(bags)
}

fn certs(path: &Path, bags: &[SafeBag]) -> Result<Vec<CertificateDer<'static>>, ResourceError> {
    let certs = bags
        .iter()
        .filter_map(|bag| match &bag.bag {
            SafeBagKind::CertBag(CertBag::X509(der)) => Some(CertificateDer::from(der.clone())),
            _ => None,
        })
        .collect::<Vec<_>>();
    if certs.is_empty() {
        return Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::NoCertificates,
        ));
    }
    check_certificates(path, ContainerFormat::Pkcs12, &certs)?;
    Ok(certs)
}

/// Decode the private keys and certificates of a keystore.
pub fn key_entries(path: &Path, contents: &[u8], password: &str) -> Result<Entries, ResourceError> {
    let bags = open(path, contents, password)?;
    let bmp = bmp_password(password);
    let mut keys = Vec::new();
    for bag in &bags {
        let der = match &bag.bag {
            SafeBagKind::Pkcs8ShroudedKeyBag(shrouded) => {
                if is_other(&shrouded.encryption_algorithm) {
                    return Err(unsupported(
                        path,
                        &shrouded.encryption_algorithm,
                        "private key encryption",
                    ));
                }
                shrouded
                    .decrypt(&bmp)
                    .ok_or_else(|| malformed(path, "private key could not be decrypted".into()))?
            }
            SafeBagKind::OtherBagKind(other) if other.bag_id.components().as_slice() == &KEY_BAG[..] => {
                other.bag_value.clone()
            }
            _ => continue,
        };
        keys.push(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(der)));
    }
    if keys.is_empty() {
        return Err(ResourceError::decode(
            path,
            ContainerFormat::Pkcs12,
            DecodeReason::NoPrivateKey,
        ));
    }
    let certs = certs(path, &bags)?;
    Ok(Entries { keys, certs })
}

/// Decode the certificates of a truststore. Key entries are ignored.
pub fn trusted_certificates(
    path: &Path,
    contents: &[u8],
    password: &str,
) -> Result<Vec<CertificateDer<'static>>, ResourceError> {
    let bags = open(path, contents, password)?;
    certs(path, &bags)
}
