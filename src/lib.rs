//! Load TLS key and trust material named by configuration, with precise
//! diagnostics when anything goes wrong.
//!
//! A process may run several independent TLS contexts (a transport layer,
//! an HTTP server, a directory-protocol client...), each configured under
//! its own settings prefix. For each prefix an [`SslLoader`] resolves the
//! configured keystore, truststore, PEM certificate, PEM key, or
//! certificate-authority files against the configuration directory,
//! refuses any that lie outside it, reads them, decodes them, and
//! assembles rustls-ready material:
//!
//! ```no_run
//! use ssl_resources::{Settings, SslLoader};
//!
//! let mut settings = Settings::new();
//! settings
//!     .put("xpack.http.ssl.certificate", "http.crt")
//!     .put("xpack.http.ssl.key", "http.key");
//! let loader = SslLoader::new(settings, "/etc/app/config");
//! match loader.load_key_material("xpack.http.ssl") {
//!     Ok(material) => println!("{} certificate(s)", material.chain().len()),
//!     Err(e) => {
//!         // failed to load SSL configuration [xpack.http.ssl]
//!         let mut cause: Option<&dyn std::error::Error> = Some(&e);
//!         while let Some(c) = cause {
//!             eprintln!("{c}");
//!             cause = c.source();
//!         }
//!     }
//! }
//! ```
//!
//! Failures of a configured file are reported as a [`DiagnosticChain`] of
//! exactly three levels whose wording is stable:
//!
//! * `failed to load SSL configuration [<prefix>]`
//! * `failed to initialize SSL <KeyManager|TrustManager> - <reason>`
//! * the underlying failure, naming the path.
//!
//! Settings that contradict each other produce a
//! [`ConfigurationConflict`] instead, before any file is read.

#![warn(missing_docs)]

pub mod assemble;
pub mod crypto_provider;
pub mod decode;
pub mod error;
pub mod policy;
pub mod reader;
pub mod resolver;
pub mod role;
pub mod settings;
#[cfg(test)]
mod testdata;

pub use assemble::{KeyMaterial, SslConfiguration, SslLoader, TrustMaterial};
pub use decode::ContainerFormat;
pub use error::{
    ConfigurationConflict, DecodeReason, DiagnosticChain, DiagnosticLevel, DiagnosticRecord,
    LoadStage, ManagerInitError, ResourceError, SslConfigError,
};
pub use role::{ManagerType, ResourceReference, ResourceRole};
pub use settings::{Args, ArgsError, Settings};
