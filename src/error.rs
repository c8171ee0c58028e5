//! Error taxonomy and the diagnostic chain built from it.
//!
//! A failed resource produces exactly three linked errors:
//!
//! 1. [`DiagnosticChain`]: `failed to load SSL configuration [<prefix>]`.
//!    Names the prefix and never a path.
//! 2. [`ManagerInitError`]: `failed to initialize SSL <Manager> - <reason>`.
//!    Names the resource role and path.
//! 3. [`ResourceError`]: the original failure, carrying the literal path.
//!
//! They are chained through [`std::error::Error::source`] and are also
//! available as an ordered list from [`DiagnosticChain::records`].

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::decode::ContainerFormat;
use crate::role::{ManagerType, ResourceReference, ResourceRole};

/// Pipeline stage at which a resource failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStage {
    /// Turning the configured string into a path.
    Resolving,
    /// Checking the path against the configuration directory.
    PolicyChecking,
    /// Opening and reading the file.
    Reading,
    /// Interpreting the bytes as a container.
    Decoding,
    /// Combining decoded objects into manager material.
    Assembling,
}

/// Structural reason a container could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeReason {
    /// PKCS#12 integrity check failed for the supplied password.
    #[error("the password is incorrect")]
    IncorrectPassword,
    /// ASN.1, PEM, or base64 structure is damaged.
    #[error("malformed content: {0}")]
    Malformed(String),
    /// The container holds no certificates where some are required.
    #[error("no certificates found")]
    NoCertificates,
    /// The container holds no private key where one is required.
    #[error("no private key found")]
    NoPrivateKey,
    /// Container type or encoding that this loader does not read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Container protection or key type this loader cannot use.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The private key does not belong to the leaf certificate.
    #[error("the private key does not match the certificate")]
    KeyMismatch,
}

/// The underlying failure for one resource. This is the root of every
/// [`DiagnosticChain`] and always names the path it concerns.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The file does not exist.
    #[error("{}: {io}", path.display())]
    NotFound {
        /// Resolved path.
        path: PathBuf,
        /// Error reported by the operating system.
        io: std::io::Error,
    },
    /// The file exists but the process may not read it.
    #[error("{}: {io}", path.display())]
    AccessDenied {
        /// Resolved path.
        path: PathBuf,
        /// Error reported by the operating system.
        io: std::io::Error,
    },
    /// Any other failure opening or reading the file.
    #[error("{}: {io}", path.display())]
    Io {
        /// Resolved path.
        path: PathBuf,
        /// Error reported by the operating system.
        io: std::io::Error,
    },
    /// The path lies outside the configuration directory.
    #[error("read access to [{}] denied: not within [{}]", path.display(), config_dir.display())]
    PolicyBlocked {
        /// Resolved path.
        path: PathBuf,
        /// Directory that SSL resources must live in.
        config_dir: PathBuf,
    },
    /// The bytes could not be decoded as the expected container.
    #[error("invalid {format} [{}]: {reason}", path.display())]
    Decode {
        /// Resolved path.
        path: PathBuf,
        /// Container format that was expected.
        format: ContainerFormat,
        /// What was wrong.
        reason: DecodeReason,
        /// Whether the failure surfaced while assembling decoded objects.
        assembling: bool,
    },
}

impl ResourceError {
    pub(crate) fn decode(path: &Path, format: ContainerFormat, reason: DecodeReason) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            format,
            reason,
            assembling: false,
        }
    }

    pub(crate) fn assembly(path: &Path, format: ContainerFormat, reason: DecodeReason) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            format,
            reason,
            assembling: true,
        }
    }

    /// The resolved path this failure concerns.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::AccessDenied { path, .. }
            | Self::Io { path, .. }
            | Self::PolicyBlocked { path, .. }
            | Self::Decode { path, .. } => path,
        }
    }

    /// The pipeline stage that failed.
    pub fn stage(&self) -> LoadStage {
        match self {
            Self::PolicyBlocked { .. } => LoadStage::PolicyChecking,
            Self::NotFound { .. } | Self::AccessDenied { .. } | Self::Io { .. } => {
                LoadStage::Reading
            }
            Self::Decode {
                assembling: false, ..
            } => LoadStage::Decoding,
            Self::Decode {
                assembling: true, ..
            } => LoadStage::Assembling,
        }
    }

    fn reason_phrase(&self, file_type: &str) -> String {
        let path = self.path().display();
        match self {
            Self::NotFound { .. } => format!("{file_type} file [{path}] does not exist"),
            Self::AccessDenied { .. } => format!("not permitted to read {file_type} file [{path}]"),
            Self::Io { .. } => format!("failed to read {file_type} file [{path}]"),
            Self::PolicyBlocked { config_dir, .. } => format!(
                "access to read {file_type} file [{path}] is blocked; SSL resources should be placed in the [{}] directory",
                config_dir.display()
            ),
            Self::Decode { format, reason, .. } => {
                format!("cannot read {file_type} file [{path}] as {format} - {reason}")
            }
        }
    }
}

/// Middle level of a [`DiagnosticChain`].
#[derive(Debug, Error)]
#[error("failed to initialize SSL {manager} - {reason}")]
pub struct ManagerInitError {
    manager: ManagerType,
    role: ResourceRole,
    config_key: String,
    reason: String,
    #[source]
    root: ResourceError,
}

impl ManagerInitError {
    /// Which manager could not be initialized.
    pub fn manager(&self) -> ManagerType {
        self.manager
    }

    /// Which resource failed.
    pub fn role(&self) -> ResourceRole {
        self.role
    }

    /// The setting key that named the failed resource.
    pub fn config_key(&self) -> &str {
        &self.config_key
    }

    /// The underlying failure.
    pub fn root(&self) -> &ResourceError {
        &self.root
    }
}

/// Level of a [`DiagnosticRecord`], outermost first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// Names the configuration prefix only.
    Configuration,
    /// Names the manager, resource role, and path.
    Manager,
    /// The original failure.
    Resource,
}

/// One message of a [`DiagnosticChain`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Position in the chain.
    pub level: DiagnosticLevel,
    /// Rendered message.
    pub message: String,
}

/// Three-level diagnostic for a resource that failed to load. Its own
/// message is the top level.
#[derive(Debug, Error)]
#[error("failed to load SSL configuration [{prefix}]")]
pub struct DiagnosticChain {
    prefix: String,
    #[source]
    cause: ManagerInitError,
}

impl DiagnosticChain {
    /// The configuration prefix that failed.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The middle level.
    pub fn manager_error(&self) -> &ManagerInitError {
        &self.cause
    }

    /// The root cause.
    pub fn root(&self) -> &ResourceError {
        &self.cause.root
    }

    /// All three messages, outermost first.
    pub fn records(&self) -> [DiagnosticRecord; 3] {
        [
            DiagnosticRecord {
                level: DiagnosticLevel::Configuration,
                message: self.to_string(),
            },
            DiagnosticRecord {
                level: DiagnosticLevel::Manager,
                message: self.cause.to_string(),
            },
            DiagnosticRecord {
                level: DiagnosticLevel::Resource,
                message: self.cause.root.to_string(),
            },
        ]
    }
}

/// Build the diagnostic chain for a failed resource.
pub fn translate(prefix: &str, reference: &ResourceReference, root: ResourceError) -> DiagnosticChain {
    let role = reference.role;
    DiagnosticChain {
        prefix: prefix.to_string(),
        cause: ManagerInitError {
            manager: role.manager(),
            role,
            config_key: reference.config_key.clone(),
            reason: root.reason_phrase(role.file_type()),
            root,
        },
    }
}

/// Violations of the rule that each manager is configured from exactly
/// one source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationConflict {
    /// Both alternatives are configured.
    #[error("cannot configure both [{first}] and [{second}] for the SSL {manager}")]
    Ambiguous {
        /// Affected manager.
        manager: ManagerType,
        /// Setting of the preferred alternative.
        first: String,
        /// Setting of the other alternative.
        second: String,
    },
    /// Half of a certificate and key pair is configured.
    #[error("[{present}] is configured without [{missing}] for the SSL {manager}")]
    Incomplete {
        /// Affected manager.
        manager: ManagerType,
        /// Setting that is present.
        present: String,
        /// Setting that is absent.
        missing: String,
    },
    /// Neither alternative is configured.
    #[error("no SSL {manager} resources are configured; set [{first}] or [{second}]")]
    Missing {
        /// Affected manager.
        manager: ManagerType,
        /// Setting of the preferred alternative.
        first: String,
        /// Setting of the other alternative.
        second: String,
    },
}

/// Error returned for a configuration prefix that cannot be loaded.
#[derive(Debug, Error)]
pub enum SslConfigError {
    /// A configured resource failed.
    #[error(transparent)]
    Resource(#[from] DiagnosticChain),
    /// The resource settings contradict each other.
    #[error("failed to load SSL configuration [{prefix}]")]
    Conflict {
        /// Prefix whose settings conflict.
        prefix: String,
        /// What conflicts.
        #[source]
        conflict: ConfigurationConflict,
    },
}

impl SslConfigError {
    /// The prefix that failed to load.
    pub fn prefix(&self) -> &str {
        match self {
            Self::Resource(chain) => chain.prefix(),
            Self::Conflict { prefix, .. } => prefix,
        }
    }

    /// The diagnostic chain, if a resource failed.
    pub fn chain(&self) -> Option<&DiagnosticChain> {
        match self {
            Self::Resource(chain) => Some(chain),
            Self::Conflict { .. } => None,
        }
    }

    /// The conflict, if the settings contradict each other.
    pub fn conflict(&self) -> Option<&ConfigurationConflict> {
        match self {
            Self::Resource(_) => None,
            Self::Conflict { conflict, .. } => Some(conflict),
        }
    }
}
