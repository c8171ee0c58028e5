#![allow(dead_code)]

use ssl_resources::{Settings, SslConfigError, SslLoader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const USER1_KEY: &[u8] = include_bytes!("../../testdata/user1.key");
pub const USER1_CERT: &[u8] = include_bytes!("../../testdata/user1.crt");
pub const CACERT: &[u8] = include_bytes!("../../testdata/ca.crt");
pub const USER1_P12_PASSWORD: &str = "cert1a-p12-password";
/// Written by `openssl pkcs12 -export` with default settings (SHA-256 MAC,
/// PBES2 with AES-256-CBC), password `user1-password`.
pub const OPENSSL_DEFAULT_P12: &[u8] = include_bytes!("../../testdata/user1-modern.p12");

pub const PREFIXES: [&str; 6] = [
    "xpack.security.transport.ssl",
    "xpack.security.http.ssl",
    "xpack.http.ssl",
    "xpack.security.authc.realms.ldap.ldap1.ssl",
    "xpack.security.authc.realms.saml.saml1.ssl",
    "xpack.monitoring.exporters.http.ssl",
];

pub fn user1_pkcs12(password: &str) -> Vec<u8> {
    let key = rustls_pemfile::private_key(&mut Cursor::new(USER1_KEY))
        .unwrap()
        .unwrap();
    let cert = rustls_pemfile::certs(&mut Cursor::new(USER1_CERT))
        .next()
        .unwrap()
        .unwrap();
    let ca = rustls_pemfile::certs(&mut Cursor::new(CACERT))
        .next()
        .unwrap()
        .unwrap();
    p12::PFX::new(
        cert.as_ref(),
        key.secret_der(),
        Some(ca.as_ref()),
        password,
        "cert1a",
    )
    .unwrap()
    .to_der()
}

/// A configuration directory holding working SSL resources.
pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let write = |name: &str, contents: &[u8]| {
            std::fs::write(dir.path().join(name), contents).expect("write fixture")
        };
        write("cert1a.key", USER1_KEY);
        write("cert1a.crt", USER1_CERT);
        write("ca1.crt", CACERT);
        write("cert1a.p12", &user1_pkcs12(USER1_P12_PASSWORD));
        Self { dir }
    }

    pub fn config_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path string of a fixture file.
    pub fn resource(&self, name: &str) -> String {
        let path = self.dir.path().join(name);
        assert!(path.exists(), "fixture {} has not been written", name);
        path.display().to_string()
    }

    pub fn missing_file(&self) -> String {
        self.resource("cert1a.p12").replace("cert1a.p12", "file.dne")
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write");
        path.display().to_string()
    }

    /// Copy a fixture to a new file with no permissions. Returns `None` if
    /// the process can read it anyway, as root can.
    #[cfg(unix)]
    pub fn unreadable_copy(&self, name: &str) -> Option<String> {
        use std::os::unix::fs::PermissionsExt;

        let to: PathBuf = self.dir.path().join(format!("{name}-no-read"));
        std::fs::copy(self.dir.path().join(name), &to).expect("copy");
        std::fs::set_permissions(&to, std::fs::Permissions::from_mode(0o000)).expect("chmod");
        if std::fs::File::open(&to).is_ok() {
            eprintln!("skipping: process can read mode 000 files");
            return None;
        }
        Some(to.display().to_string())
    }

    pub fn working_keystore(&self, prefix: &str, settings: &mut Settings) {
        settings.put(format!("{prefix}.keystore.path"), self.resource("cert1a.p12"));
        settings.put_secure(
            format!("{prefix}.keystore.secure_password"),
            USER1_P12_PASSWORD,
        );
    }

    pub fn working_truststore(&self, prefix: &str, settings: &mut Settings) {
        settings.put(format!("{prefix}.truststore.path"), self.resource("cert1a.p12"));
        settings.put_secure(
            format!("{prefix}.truststore.secure_password"),
            USER1_P12_PASSWORD,
        );
    }

    pub fn expect_failure(&self, settings: Settings, prefix: &str) -> SslConfigError {
        match SslLoader::new(settings, self.config_dir()).load(prefix) {
            Ok(_) => panic!("loading [{}] unexpectedly succeeded", prefix),
            Err(e) => e,
        }
    }
}
