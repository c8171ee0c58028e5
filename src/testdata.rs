use rustls_pki_types::CertificateDer;
use std::io::Cursor;
use std::path::PathBuf;

pub(crate) const USER1_KEY: &[u8] = include_bytes!("../testdata/user1.key");
pub(crate) const USER1_CERT: &[u8] = include_bytes!("../testdata/user1.crt");
pub(crate) const CACERT: &[u8] = include_bytes!("../testdata/ca.crt");

// USER1 and CA exported by OpenSSL 3.5 `pkcs12 -export`: with default
// settings, with `-macalg sha1` and AES bags, and with `-macalg sha1
// -certpbe NONE` and an AES key bag.
pub(crate) const OPENSSL_P12_PASSWORD: &str = "user1-password";
pub(crate) const OPENSSL_DEFAULT_P12: &[u8] = include_bytes!("../testdata/user1-modern.p12");
pub(crate) const OPENSSL_AES_P12: &[u8] = include_bytes!("../testdata/user1-aes-sha1mac.p12");
pub(crate) const OPENSSL_AES_KEY_P12: &[u8] = include_bytes!("../testdata/user1-aes-key.p12");

fn der_certs(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    rustls_pemfile::certs(&mut Cursor::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// USER1's key, certificate, and the CA certificate in one PKCS#12 blob.
pub(crate) fn user1_pkcs12(password: &str) -> Vec<u8> {
    let key = rustls_pemfile::private_key(&mut Cursor::new(USER1_KEY))
        .unwrap()
        .unwrap();
    let cert = der_certs(USER1_CERT).remove(0);
    let ca = der_certs(CACERT).remove(0);
    p12::PFX::new(
        cert.as_ref(),
        key.secret_der(),
        Some(ca.as_ref()),
        password,
        "user1",
    )
    .unwrap()
    .to_der()
}

/// A configuration directory populated with the USER1 fixtures.
pub(crate) struct ConfigDir {
    pub(crate) dir: tempfile::TempDir,
}

impl ConfigDir {
    pub(crate) fn user1() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("user1.key"), USER1_KEY)?;
        std::fs::write(dir.path().join("user1.crt"), USER1_CERT)?;
        std::fs::write(dir.path().join("ca.crt"), CACERT)?;
        std::fs::write(dir.path().join("user1.p12"), user1_pkcs12("user1-password"))?;
        Ok(Self { dir })
    }

    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
