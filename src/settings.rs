//! Configuration input: prefixed settings, secure settings, and the
//! command line flags that populate them.
//!
//! # Command line flags
//!
//! | Flag               | Default  | Meaning                 |
//! |--------------------|----------|-------------------------|
//! | `--ssl-config-dir` | Required | Directory that all SSL resources must be placed in |
//! | `--ssl-setting`    | None     | `KEY=VALUE` setting such as `xpack.http.ssl.key=http.key`; may be repeated |

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

use crate::assemble::SslLoader;
use crate::role::{KEY_MANAGER_ROLES, ResourceRole, TRUST_MANAGER_ROLES};

/// Which PKCS#12 container a passphrase or type setting belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Store {
    Keystore,
    Truststore,
}

impl Store {
    fn name(self) -> &'static str {
        match self {
            Self::Keystore => "keystore",
            Self::Truststore => "truststore",
        }
    }
}

/// Settings for any number of configuration prefixes.
///
/// Passphrases live in the separate secure map. For compatibility a plain
/// `<prefix>.keystore.password` is honoured when no
/// `<prefix>.keystore.secure_password` is set.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    plain: BTreeMap<String, String>,
    secure: BTreeMap<String, String>,
}

impl Settings {
    /// Empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain setting.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.plain.insert(key.into(), value.into());
        self
    }

    /// Set a secure setting.
    pub fn put_secure(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.secure.insert(key.into(), value.into());
        self
    }

    /// A plain setting. Blank values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.plain
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// A secure setting.
    pub fn get_secure(&self, key: &str) -> Option<&str> {
        self.secure.get(key).map(String::as_str)
    }

    /// Every prefix that names at least one SSL resource, in sorted order.
    ///
    /// The bare `certificate` and `key` settings are common outside SSL, so
    /// they only mark a prefix whose last segment is `ssl`. Store paths and
    /// `certificate_authorities` mark any prefix.
    pub fn prefixes(&self) -> BTreeSet<String> {
        self.plain
            .keys()
            .filter_map(|key| {
                KEY_MANAGER_ROLES
                    .iter()
                    .chain(TRUST_MANAGER_ROLES.iter())
                    .find_map(|role| {
                        let prefix = key.strip_suffix(role.setting())?.strip_suffix('.')?;
                        let generic = matches!(role, ResourceRole::Certificate | ResourceRole::Key);
                        let ssl = prefix.rsplit('.').next() == Some("ssl");
                        (!generic || ssl).then_some(prefix)
                    })
            })
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn password(&self, prefix: &str, store: Store) -> &str {
        let name = store.name();
        self.get_secure(&format!("{prefix}.{name}.secure_password"))
            .or_else(|| {
                self.plain
                    .get(&format!("{prefix}.{name}.password"))
                    .map(String::as_str)
            })
            .unwrap_or("")
    }

    pub(crate) fn store_type(&self, prefix: &str, store: Store) -> Option<&str> {
        self.get(&format!("{prefix}.{}.type", store.name()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (k, v) in iter {
            settings.put(k, v);
        }
        settings
    }
}

fn parse_setting(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got [{s}]"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in [{s}]"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Command line arguments for building an [`SslLoader`].
#[derive(clap::Args, Debug, Default)]
#[group(id = "ssl_resources_args")]
pub struct Args {
    #[arg(
        long,
        help = "Directory that SSL keys, certificates and keystores must be placed in."
    )]
    ssl_config_dir: Option<PathBuf>,

    #[arg(
        long,
        value_parser = parse_setting,
        help = "SSL setting as KEY=VALUE, for example xpack.http.ssl.key=http.key. May be repeated."
    )]
    ssl_setting: Vec<(String, String)>,
}

/// Error type returned by [`Args::into_loader`].
#[derive(Debug, Error)]
pub enum ArgsError {
    /// Wrapper for std::io::Error
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    /// The configuration directory flag is missing.
    #[error("--ssl-config-dir not given")]
    NoConfigDir,
}

impl Args {
    /// Build a loader from the flags. A relative configuration directory
    /// is made absolute against the current directory.
    pub fn into_loader(self) -> Result<SslLoader, ArgsError> {
        let config_dir = std::path::absolute(self.ssl_config_dir.ok_or(ArgsError::NoConfigDir)?)?;
        Ok(SslLoader::new(
            self.ssl_setting.into_iter().collect(),
            config_dir,
        ))
    }
}
