//! Assemble key manager and trust manager material for a configuration
//! prefix.
//!
//! Each manager is configured from exactly one source:
//!
//! | Manager       | First choice                | Alternative                      |
//! |---------------|-----------------------------|----------------------------------|
//! | Key manager   | `<prefix>.keystore.path`    | `<prefix>.certificate` + `<prefix>.key` |
//! | Trust manager | `<prefix>.truststore.path`  | `<prefix>.certificate_authorities` |
//!
//! Conflicting or incomplete settings are reported as a
//! [`ConfigurationConflict`] before any file is touched. Resources are then
//! loaded one at a time in the fixed role order, each going through the
//! containment check, the read, and the decode; the first failure ends the
//! load and is returned as a [`DiagnosticChain`].

use rustls::crypto::CryptoProvider;
use rustls::sign::{CertifiedKey, SigningKey};
use rustls::{InconsistentKeys, RootCertStore};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, TrustAnchor};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decode::{ContainerFormat, pem, pkcs12};
use crate::error::{
    ConfigurationConflict, DecodeReason, DiagnosticChain, LoadStage, ResourceError,
    SslConfigError, translate,
};
use crate::role::{ManagerType, ResourceReference, ResourceRole};
use crate::settings::{Settings, Store};
use crate::{policy, reader, resolver};

/// A private key with its certificate chain, leaf first.
#[derive(Debug)]
pub struct KeyMaterial {
    certified_key: Arc<CertifiedKey>,
    private_key: PrivateKeyDer<'static>,
}

impl KeyMaterial {
    /// Signing key and chain ready for a rustls certificate resolver.
    pub fn certified_key(&self) -> Arc<CertifiedKey> {
        Arc::clone(&self.certified_key)
    }

    /// The certificate chain, leaf first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.certified_key.cert
    }

    /// The private key as decoded from its container.
    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.private_key
    }
}

/// Trust anchors for verifying peers.
#[derive(Debug)]
pub struct TrustMaterial {
    certs: Vec<CertificateDer<'static>>,
    anchors: Vec<TrustAnchor<'static>>,
}

impl TrustMaterial {
    /// The trusted certificates, in the order they were loaded.
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certs
    }

    /// The trust anchors extracted from [`Self::certificates`].
    pub fn anchors(&self) -> &[TrustAnchor<'static>] {
        &self.anchors
    }

    /// A root store holding every anchor.
    pub fn root_store(&self) -> RootCertStore {
        RootCertStore {
            roots: self.anchors.clone(),
        }
    }
}

/// Everything loaded for one configuration prefix. A manager with no
/// configured resources is `None`.
#[derive(Debug, Default)]
pub struct SslConfiguration {
    /// Local identity.
    pub key: Option<KeyMaterial>,
    /// Peer verification anchors.
    pub trust: Option<TrustMaterial>,
}

enum KeySource {
    Keystore(ResourceReference),
    Pem {
        certificate: ResourceReference,
        key: ResourceReference,
    },
}

enum TrustSource {
    Truststore(ResourceReference),
    Authorities(Vec<ResourceReference>),
}

/// Loads SSL material for configuration prefixes from files inside a
/// configuration directory.
///
/// The loader holds no state between calls: every load resolves, reads,
/// and decodes its files afresh, and independent prefixes may be loaded
/// concurrently from different threads.
pub struct SslLoader {
    settings: Settings,
    config_dir: PathBuf,
    crypto_provider: Arc<CryptoProvider>,
}

impl SslLoader {
    /// Every resource must live inside `config_dir`. A relative directory
    /// is made absolute against the working directory; one that cannot be
    /// (such as an empty path) admits no resources at all.
    pub fn new(settings: Settings, config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            settings,
            config_dir: std::path::absolute(&config_dir).unwrap_or(config_dir),
            crypto_provider: crate::crypto_provider::default_provider(),
        }
    }

    /// Use `crypto_provider` to load private keys instead of the default.
    pub fn with_crypto_provider(mut self, crypto_provider: Arc<CryptoProvider>) -> Self {
        self.crypto_provider = crypto_provider;
        self
    }

    /// Add a secure setting such as `<prefix>.keystore.secure_password`.
    pub fn with_secure_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.put_secure(key, value);
        self
    }

    /// The settings this loader reads.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The directory all resources must be placed in.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load the key manager material for `prefix`. Either a keystore or a
    /// certificate and key pair must be configured.
    pub fn load_key_material(&self, prefix: &str) -> Result<KeyMaterial, SslConfigError> {
        let source = self
            .key_source(prefix)?
            .ok_or_else(|| conflict(prefix, missing(prefix, ManagerType::KeyManager)))?;
        Ok(self.load_key(prefix, source)?)
    }

    /// Load the trust manager material for `prefix`. Either a truststore or
    /// certificate authorities must be configured.
    pub fn load_trust_material(&self, prefix: &str) -> Result<TrustMaterial, SslConfigError> {
        let source = self
            .trust_source(prefix)?
            .ok_or_else(|| conflict(prefix, missing(prefix, ManagerType::TrustManager)))?;
        Ok(self.load_trust(prefix, source)?)
    }

    /// Load whatever is configured for `prefix`, key manager first.
    ///
    /// Settings for both managers are checked for conflicts before any
    /// file is read.
    pub fn load(&self, prefix: &str) -> Result<SslConfiguration, SslConfigError> {
        let key_source = self.key_source(prefix)?;
        let trust_source = self.trust_source(prefix)?;
        let key = key_source
            .map(|source| self.load_key(prefix, source))
            .transpose()?;
        let trust = trust_source
            .map(|source| self.load_trust(prefix, source))
            .transpose()?;
        Ok(SslConfiguration { key, trust })
    }

    /// Load every prefix found in the settings, in sorted order. The first
    /// prefix that fails ends the load.
    pub fn load_all(&self) -> Result<BTreeMap<String, SslConfiguration>, SslConfigError> {
        self.settings
            .prefixes()
            .into_iter()
            .map(|prefix| {
                let configuration = self.load(&prefix)?;
                Ok((prefix, configuration))
            })
            .collect()
    }

    fn reference(&self, prefix: &str, role: ResourceRole, configured: &str) -> ResourceReference {
        log::debug!("{:?} {} [{}] for [{}]", LoadStage::Resolving, role, configured, prefix);
        ResourceReference {
            role,
            config_key: role.config_key(prefix),
            path: resolver::resolve(&self.config_dir, configured),
        }
    }

    fn configured(&self, prefix: &str, role: ResourceRole) -> Option<&str> {
        self.settings.get(&role.config_key(prefix))
    }

    fn key_source(&self, prefix: &str) -> Result<Option<KeySource>, SslConfigError> {
        let keystore = self.configured(prefix, ResourceRole::Keystore);
        let certificate = self.configured(prefix, ResourceRole::Certificate);
        let key = self.configured(prefix, ResourceRole::Key);
        let key_of = |role: ResourceRole| role.config_key(prefix);
        let manager = ManagerType::KeyManager;
        match (keystore, certificate, key) {
            (None, None, None) => Ok(None),
            (Some(keystore), None, None) => Ok(Some(KeySource::Keystore(self.reference(
                prefix,
                ResourceRole::Keystore,
                keystore,
            )))),
            (None, Some(certificate), Some(key)) => Ok(Some(KeySource::Pem {
                certificate: self.reference(prefix, ResourceRole::Certificate, certificate),
                key: self.reference(prefix, ResourceRole::Key, key),
            })),
            (Some(_), certificate, _) => {
                let second = if certificate.is_some() {
                    ResourceRole::Certificate
                } else {
                    ResourceRole::Key
                };
                Err(conflict(
                    prefix,
                    ConfigurationConflict::Ambiguous {
                        manager,
                        first: key_of(ResourceRole::Keystore),
                        second: key_of(second),
                    },
                ))
            }
            (None, Some(_), None) => Err(conflict(
                prefix,
                ConfigurationConflict::Incomplete {
                    manager,
                    present: key_of(ResourceRole::Certificate),
                    missing: key_of(ResourceRole::Key),
                },
            )),
            (None, None, Some(_)) => Err(conflict(
                prefix,
                ConfigurationConflict::Incomplete {
                    manager,
                    present: key_of(ResourceRole::Key),
                    missing: key_of(ResourceRole::Certificate),
                },
            )),
        }
    }

    fn trust_source(&self, prefix: &str) -> Result<Option<TrustSource>, SslConfigError> {
        let truststore = self.configured(prefix, ResourceRole::Truststore);
        let authorities = self.configured(prefix, ResourceRole::CertificateAuthorities);
        match (truststore, authorities) {
            (None, None) => Ok(None),
            (Some(truststore), None) => Ok(Some(TrustSource::Truststore(self.reference(
                prefix,
                ResourceRole::Truststore,
                truststore,
            )))),
            (None, Some(authorities)) => {
                let references = authorities
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| self.reference(prefix, ResourceRole::CertificateAuthorities, p))
                    .collect::<Vec<_>>();
                Ok((!references.is_empty()).then_some(TrustSource::Authorities(references)))
            }
            (Some(_), Some(_)) => Err(conflict(
                prefix,
                ConfigurationConflict::Ambiguous {
                    manager: ManagerType::TrustManager,
                    first: ResourceRole::Truststore.config_key(prefix),
                    second: ResourceRole::CertificateAuthorities.config_key(prefix),
                },
            )),
        }
    }

    /// Check, read, and decode one resource. Any failure is translated
    /// here and nowhere else.
    fn attempt<T>(
        &self,
        prefix: &str,
        reference: &ResourceReference,
        decode: impl FnOnce(&Path, &[u8]) -> Result<T, ResourceError>,
    ) -> Result<T, DiagnosticChain> {
        let path = &reference.path;
        let run = || -> Result<T, ResourceError> {
            log::debug!("{:?} {} [{}]", LoadStage::PolicyChecking, reference.role, path.display());
            policy::check(path, &self.config_dir)?;
            log::debug!("{:?} {} [{}]", LoadStage::Reading, reference.role, path.display());
            let contents = reader::read(path)?;
            log::debug!("{:?} {} [{}]", LoadStage::Decoding, reference.role, path.display());
            decode(path, &contents)
        };
        run().map_err(|e| translate(prefix, reference, e))
    }

    fn signing_key(
        &self,
        path: &Path,
        format: ContainerFormat,
        key: &PrivateKeyDer<'static>,
    ) -> Result<Arc<dyn SigningKey>, ResourceError> {
        self.crypto_provider
            .key_provider
            .load_private_key(key.clone_key())
            .map_err(|e| {
                ResourceError::decode(
                    path,
                    format,
                    DecodeReason::UnsupportedAlgorithm(format!("private key: {e}")),
                )
            })
    }

    fn load_key(&self, prefix: &str, source: KeySource) -> Result<KeyMaterial, DiagnosticChain> {
        let material = match source {
            KeySource::Keystore(reference) => {
                let password = self.settings.password(prefix, Store::Keystore);
                let declared = self.settings.store_type(prefix, Store::Keystore);
                self.attempt(prefix, &reference, |path, contents| {
                    pkcs12::check_declared_type(path, declared)?;
                    let mut entries = pkcs12::key_entries(path, contents, password)?;
                    let format = ContainerFormat::Pkcs12;
                    let private_key = entries.keys.remove(0);
                    let signing_key = self.signing_key(path, format, &private_key)?;
                    let chain = order_chain(entries.certs, &signing_key)
                        .map_err(|e| {
                            ResourceError::assembly(path, format, DecodeReason::Malformed(e.to_string()))
                        })?
                        .ok_or_else(|| ResourceError::assembly(path, format, DecodeReason::KeyMismatch))?;
                    Ok(KeyMaterial {
                        certified_key: Arc::new(CertifiedKey::new(chain, signing_key)),
                        private_key,
                    })
                })?
            }
            KeySource::Pem { certificate, key } => {
                let chain = self.attempt(prefix, &certificate, pem::certificates)?;
                self.attempt(prefix, &key, |path, contents| {
                    let format = ContainerFormat::PemPrivateKey;
                    let private_key = pem::private_key(path, contents)?;
                    let signing_key = self.signing_key(path, format, &private_key)?;
                    let certified_key = CertifiedKey::new(chain, signing_key);
                    match keys_match(&certified_key) {
                        Ok(Some(false)) => {
                            return Err(ResourceError::assembly(path, format, DecodeReason::KeyMismatch));
                        }
                        Ok(_) => (),
                        Err(e) => {
                            return Err(ResourceError::assembly(
                                path,
                                format,
                                DecodeReason::Malformed(format!("leaf certificate: {e}")),
                            ));
                        }
                    }
                    Ok(KeyMaterial {
                        certified_key: Arc::new(certified_key),
                        private_key,
                    })
                })?
            }
        };
        log::info!(
            "Loaded SSL KeyManager for [{}] with {} certificate(s)",
            prefix,
            material.chain().len()
        );
        Ok(material)
    }

    fn load_trust(&self, prefix: &str, source: TrustSource) -> Result<TrustMaterial, DiagnosticChain> {
        let mut certs = Vec::new();
        let mut anchors = Vec::new();
        match source {
            TrustSource::Truststore(reference) => {
                let password = self.settings.password(prefix, Store::Truststore);
                let declared = self.settings.store_type(prefix, Store::Truststore);
                let (c, a) = self.attempt(prefix, &reference, |path, contents| {
                    pkcs12::check_declared_type(path, declared)?;
                    let c = pkcs12::trusted_certificates(path, contents, password)?;
                    let a = to_anchors(path, ContainerFormat::Pkcs12, &c)?;
                    Ok((c, a))
                })?;
                certs.extend(c);
                anchors.extend(a);
            }
            TrustSource::Authorities(references) => {
                for reference in &references {
                    let (c, a) = self.attempt(prefix, reference, |path, contents| {
                        let c = pem::certificates(path, contents)?;
                        let a = to_anchors(path, ContainerFormat::PemCertificate, &c)?;
                        Ok((c, a))
                    })?;
                    certs.extend(c);
                    anchors.extend(a);
                }
            }
        }
        log::info!(
            "Loaded SSL TrustManager for [{}] with {} trust anchor(s)",
            prefix,
            anchors.len()
        );
        Ok(TrustMaterial { certs, anchors })
    }
}

fn conflict(prefix: &str, conflict: ConfigurationConflict) -> SslConfigError {
    SslConfigError::Conflict {
        prefix: prefix.to_string(),
        conflict,
    }
}

fn missing(prefix: &str, manager: ManagerType) -> ConfigurationConflict {
    let (first, second) = match manager {
        ManagerType::KeyManager => (ResourceRole::Keystore, ResourceRole::Certificate),
        ManagerType::TrustManager => (ResourceRole::Truststore, ResourceRole::CertificateAuthorities),
    };
    ConfigurationConflict::Missing {
        manager,
        first: first.config_key(prefix),
        second: second.config_key(prefix),
    }
}

/// `Some(false)` only if the key is known not to match the leaf, `None` if
/// the key cannot report its public half. Any other failure, such as a leaf
/// rustls cannot parse, is an error rather than a mismatch.
fn keys_match(certified_key: &CertifiedKey) -> Result<Option<bool>, rustls::Error> {
    match certified_key.keys_match() {
        Ok(()) => Ok(Some(true)),
        Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => Ok(None),
        Err(rustls::Error::InconsistentKeys(InconsistentKeys::KeyMismatch)) => Ok(Some(false)),
        Err(e) => Err(e),
    }
}

/// Put the certificate matching `signing_key` first. If the key cannot
/// report its public half, container order is kept. Certificates rustls
/// cannot parse are skipped; their error is returned only if no other
/// certificate could be compared.
fn order_chain(
    mut certs: Vec<CertificateDer<'static>>,
    signing_key: &Arc<dyn SigningKey>,
) -> Result<Option<Vec<CertificateDer<'static>>>, rustls::Error> {
    let mut unknown = false;
    let mut compared = false;
    let mut failure = None;
    for i in 0..certs.len() {
        let candidate = CertifiedKey::new(vec![certs[i].clone()], Arc::clone(signing_key));
        match keys_match(&candidate) {
            Ok(Some(true)) => {
                let leaf = certs.remove(i);
                certs.insert(0, leaf);
                return Ok(Some(certs));
            }
            Ok(None) => unknown = true,
            Ok(Some(false)) => compared = true,
            Err(e) => failure = failure.or(Some(e)),
        }
    }
    match failure {
        Some(e) if !compared && !unknown => Err(e),
        _ => Ok(unknown.then_some(certs)),
    }
}

fn to_anchors(
    path: &Path,
    format: ContainerFormat,
    certs: &[CertificateDer<'static>],
) -> Result<Vec<TrustAnchor<'static>>, ResourceError> {
    certs
        .iter()
        .enumerate()
        .map(|(i, der)| {
            webpki::anchor_from_trusted_cert(der)
                .map(|anchor| anchor.to_owned())
                .map_err(|e| {
                    ResourceError::assembly(
                        path,
                        format,
                        DecodeReason::Malformed(format!("certificate #{}: {:?}", i + 1, e)),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{self, ConfigDir};
    use std::io::Cursor;

    const PREFIX: &str = "xpack.security.transport.ssl";

    fn loader(dir: &ConfigDir, settings: &[(&str, &str)]) -> SslLoader {
        SslLoader::new(
            settings
                .iter()
                .map(|(k, v)| (format!("{PREFIX}.{k}"), v.to_string()))
                .collect(),
            dir.dir.path(),
        )
    }

    fn user1_certs() -> Vec<CertificateDer<'static>> {
        rustls_pemfile::certs(&mut Cursor::new(testdata::USER1_CERT))
            .collect::<Result<Vec<_>, _>>()
            .expect("testdata::USER1_CERT")
    }

    #[test]
    fn pem_key_material() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(&dir, &[("certificate", "user1.crt"), ("key", "user1.key")]);
        let material = loader.load_key_material(PREFIX).expect("load");
        assert_eq!(material.chain(), user1_certs().as_slice());
        assert!(matches!(material.private_key(), PrivateKeyDer::Pkcs8(_)));
    }

    #[test]
    fn keystore_key_material() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(&dir, &[("keystore.path", "user1.p12")])
            .with_secure_setting(format!("{PREFIX}.keystore.secure_password"), "user1-password");
        let material = loader.load_key_material(PREFIX).expect("load");
        assert_eq!(material.chain().len(), 2);
        assert_eq!(material.chain()[0], user1_certs()[0]);
    }

    #[test]
    fn keystore_with_legacy_password_and_type() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(
            &dir,
            &[
                ("keystore.path", "user1.p12"),
                ("keystore.password", "user1-password"),
                ("keystore.type", "PKCS12"),
            ],
        );
        assert!(loader.load_key_material(PREFIX).is_ok());
    }

    #[test]
    fn authorities_trust_material() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(&dir, &[("certificate_authorities", "ca.crt, user1.crt")]);
        let material = loader.load_trust_material(PREFIX).expect("load");
        assert_eq!(material.certificates().len(), 2);
        assert_eq!(material.anchors().len(), 2);
        assert_eq!(material.root_store().len(), 2);
    }

    #[test]
    fn truststore_trust_material() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(
            &dir,
            &[("truststore.path", "user1.p12"), ("truststore.password", "user1-password")],
        );
        let material = loader.load_trust_material(PREFIX).expect("load");
        assert_eq!(material.anchors().len(), 2);
    }

    #[test]
    fn key_mismatch_fails_on_key() {
        let dir = ConfigDir::user1().expect("fixtures");
        let other = rcgen::generate_simple_self_signed(vec!["other".to_string()]).expect("rcgen");
        std::fs::write(dir.path("other.key"), other.key_pair.serialize_pem()).expect("write");
        let loader = loader(&dir, &[("certificate", "user1.crt"), ("key", "other.key")]);
        let err = loader.load_key_material(PREFIX).unwrap_err();
        let chain = err.chain().expect("resource failure");
        assert_eq!(chain.manager_error().role(), ResourceRole::Key);
        assert_eq!(chain.root().stage(), LoadStage::Assembling);
        assert!(
            chain
                .manager_error()
                .to_string()
                .ends_with("the private key does not match the certificate")
        );
    }

    #[test]
    fn unparseable_leaf_is_not_a_mismatch() {
        let key = pem::private_key(Path::new("/c/user1.key"), testdata::USER1_KEY).expect("key");
        let signing_key = crate::crypto_provider::default_provider()
            .key_provider
            .load_private_key(key)
            .expect("signing key");
        let garbage = CertifiedKey::new(
            vec![CertificateDer::from(vec![0x30, 0x00])],
            Arc::clone(&signing_key),
        );
        assert!(keys_match(&garbage).is_err());
        assert!(order_chain(vec![CertificateDer::from(vec![0x30, 0x00])], &signing_key).is_err());

        let mut chain = user1_certs();
        chain.insert(0, CertificateDer::from(vec![0x30, 0x00]));
        let ordered = order_chain(chain, &signing_key).expect("ordered").expect("leaf found");
        assert_eq!(ordered[0], user1_certs()[0]);
    }

    #[test]
    fn empty_config_dir_admits_nothing() {
        let dir = ConfigDir::user1().expect("fixtures");
        let settings: Settings = [(
            format!("{PREFIX}.certificate_authorities"),
            dir.path("ca.crt").display().to_string(),
        )]
        .into_iter()
        .collect();
        let err = SslLoader::new(settings, "").load_trust_material(PREFIX).unwrap_err();
        let root = err.chain().expect("resource failure").root();
        assert!(matches!(root, ResourceError::PolicyBlocked { .. }), "{root:?}");
    }

    #[test]
    fn relative_config_dir_is_made_absolute() {
        let loader = SslLoader::new(Settings::new(), "config");
        assert!(loader.config_dir().is_absolute());
        assert!(loader.config_dir().ends_with("config"));
    }

    #[test]
    fn conflicts_are_found_before_reading() {
        let dir = ConfigDir::user1().expect("fixtures");
        // None of these files exist; a conflict must still win.
        let loader = loader(
            &dir,
            &[
                ("keystore.path", "missing.p12"),
                ("certificate", "missing.crt"),
                ("key", "missing.key"),
            ],
        );
        let err = loader.load_key_material(PREFIX).unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&ConfigurationConflict::Ambiguous {
                manager: ManagerType::KeyManager,
                first: format!("{PREFIX}.keystore.path"),
                second: format!("{PREFIX}.certificate"),
            })
        );
        assert_eq!(
            err.to_string(),
            format!("failed to load SSL configuration [{PREFIX}]")
        );
    }

    #[test]
    fn trust_conflict_checked_before_key_files() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(
            &dir,
            &[
                ("keystore.path", "missing.p12"),
                ("truststore.path", "user1.p12"),
                ("certificate_authorities", "ca.crt"),
            ],
        );
        let err = loader.load(PREFIX).unwrap_err();
        assert!(matches!(
            err.conflict(),
            Some(ConfigurationConflict::Ambiguous {
                manager: ManagerType::TrustManager,
                ..
            })
        ));
    }

    #[test]
    fn incomplete_and_missing() {
        let dir = ConfigDir::user1().expect("fixtures");
        let err = loader(&dir, &[("certificate", "user1.crt")])
            .load_key_material(PREFIX)
            .unwrap_err();
        assert!(matches!(
            err.conflict(),
            Some(ConfigurationConflict::Incomplete { .. })
        ));
        let err = loader(&dir, &[]).load_trust_material(PREFIX).unwrap_err();
        assert!(matches!(
            err.conflict(),
            Some(ConfigurationConflict::Missing {
                manager: ManagerType::TrustManager,
                ..
            })
        ));
    }

    #[test]
    fn load_leaves_unconfigured_manager_empty() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(&dir, &[("certificate_authorities", "ca.crt")]);
        let configuration = loader.load(PREFIX).expect("load");
        assert!(configuration.key.is_none());
        assert!(configuration.trust.is_some());
    }

    #[test]
    fn load_all_discovers_prefixes() {
        let dir = ConfigDir::user1().expect("fixtures");
        let settings: Settings = [
            ("a.ssl.certificate", "user1.crt"),
            ("a.ssl.key", "user1.key"),
            ("b.ssl.certificate_authorities", "ca.crt"),
        ]
        .into_iter()
        .collect();
        let all = SslLoader::new(settings, dir.dir.path())
            .load_all()
            .expect("load_all");
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["a.ssl", "b.ssl"]);
        assert!(all["a.ssl"].key.is_some());
        assert!(all["b.ssl"].trust.is_some());
    }

    #[test]
    fn load_all_stops_at_first_broken_prefix() {
        let dir = ConfigDir::user1().expect("fixtures");
        let settings: Settings = [
            ("a.ssl.certificate_authorities", "missing.crt"),
            ("b.ssl.certificate_authorities", "also-missing.crt"),
        ]
        .into_iter()
        .collect();
        let err = SslLoader::new(settings, dir.dir.path())
            .load_all()
            .unwrap_err();
        assert_eq!(err.prefix(), "a.ssl");
    }

    #[test]
    fn first_authority_failure_wins() {
        let dir = ConfigDir::user1().expect("fixtures");
        let loader = loader(&dir, &[("certificate_authorities", "ca.crt,first.dne,second.dne")]);
        let err = loader.load_trust_material(PREFIX).unwrap_err();
        let root = err.chain().expect("resource failure").root();
        assert_eq!(root.path(), dir.path("first.dne"));
    }
}
