//! The table of resources that a configuration prefix may name.
//!
//! Every recognized resource has a [`ResourceRole`] which fixes the setting
//! key it is read from, the label used for it in diagnostics, the
//! container format its file must hold, and which TLS manager consumes it.
//! Roles are always visited in the order of [`KEY_MANAGER_ROLES`] and
//! [`TRUST_MANAGER_ROLES`] so that the first failure reported for a
//! prefix is deterministic.

use std::path::PathBuf;

use crate::decode::ContainerFormat;

/// The TLS-context role that consumes loaded material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManagerType {
    /// Presents the local identity: a private key and its certificate chain.
    KeyManager,
    /// Validates peers against a set of trust anchors.
    TrustManager,
}

impl std::fmt::Display for ManagerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::KeyManager => "KeyManager",
            Self::TrustManager => "TrustManager",
        })
    }
}

/// One kind of file that a configuration prefix can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceRole {
    /// PKCS#12 container holding a private key and certificate chain.
    Keystore,
    /// PKCS#12 container holding trusted certificates.
    Truststore,
    /// PEM certificate chain presented with `Key`.
    Certificate,
    /// PEM private key presented with `Certificate`.
    Key,
    /// PEM bundle(s) of trusted certificates.
    CertificateAuthorities,
}

/// Key manager roles in checking order: the keystore before the PEM pair.
pub const KEY_MANAGER_ROLES: [ResourceRole; 3] = [
    ResourceRole::Keystore,
    ResourceRole::Certificate,
    ResourceRole::Key,
];

/// Trust manager roles in checking order: the truststore before PEM bundles.
pub const TRUST_MANAGER_ROLES: [ResourceRole; 2] =
    [ResourceRole::Truststore, ResourceRole::CertificateAuthorities];

impl ResourceRole {
    /// Setting key, relative to the configuration prefix, naming the file.
    pub const fn setting(self) -> &'static str {
        match self {
            Self::Keystore => "keystore.path",
            Self::Truststore => "truststore.path",
            Self::Certificate => "certificate",
            Self::Key => "key",
            Self::CertificateAuthorities => "certificate_authorities",
        }
    }

    /// Label for the file in diagnostics.
    pub const fn file_type(self) -> &'static str {
        match self {
            Self::Keystore => "keystore",
            Self::Truststore => "truststore",
            Self::Certificate => "certificate",
            Self::Key => "key",
            Self::CertificateAuthorities => "certificate_authorities",
        }
    }

    /// The manager this resource is loaded for.
    pub const fn manager(self) -> ManagerType {
        match self {
            Self::Keystore | Self::Certificate | Self::Key => ManagerType::KeyManager,
            Self::Truststore | Self::CertificateAuthorities => ManagerType::TrustManager,
        }
    }

    /// The container format the file is expected to hold.
    pub const fn container(self) -> ContainerFormat {
        match self {
            Self::Keystore | Self::Truststore => ContainerFormat::Pkcs12,
            Self::Certificate | Self::CertificateAuthorities => ContainerFormat::PemCertificate,
            Self::Key => ContainerFormat::PemPrivateKey,
        }
    }

    /// Whether the setting may hold a comma-separated list of paths.
    pub const fn is_list(self) -> bool {
        matches!(self, Self::CertificateAuthorities)
    }

    /// Fully qualified setting key for `prefix`.
    pub fn config_key(self, prefix: &str) -> String {
        format!("{}.{}", prefix, self.setting())
    }
}

impl std::fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_type())
    }
}

/// A configured resource, created when a prefix's settings are read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceReference {
    /// What the file is for.
    pub role: ResourceRole,
    /// The fully qualified setting key the path came from.
    pub config_key: String,
    /// The resolved absolute path.
    pub path: PathBuf,
}
