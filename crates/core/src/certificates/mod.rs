//! Certificate store for pass signing.
//!
//! A pass can only be signed when the full bundle is present: the Pass Type
//! ID certificate, its private key, and the WWDR intermediate certificate.
//! Material is read from `PASS_CERT_PEM` / `PASS_KEY_PEM` / `WWDR_CERT_PEM`
//! environment variables (base64 PEM, for container deployments) or from PEM
//! files in the configured directory. The bundle is read-only after load.

use std::path::Path;

use base64::Engine;
use openssl::asn1::Asn1Time;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::CertificatesConfig;

/// Error type for certificate loading.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Failed to read certificate file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse certificate material: {0}")]
    Parse(String),

    #[error("Incomplete certificate bundle: {0}")]
    Incomplete(String),

    #[error("Certificate is expired: {0}")]
    Expired(String),

    #[error("Certificate is not yet valid: {0}")]
    NotYetValid(String),
}

/// Identifiers extracted from the Pass Type ID certificate subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassIdentifiers {
    /// passTypeIdentifier, from the subject UID attribute.
    pub pass_type_identifier: String,
    /// teamIdentifier, from the subject OU attribute.
    pub team_identifier: String,
}

/// The loaded signing bundle: pass certificate, private key, WWDR chain.
pub struct CertificateBundle {
    pass_cert: X509,
    private_key: PKey<Private>,
    wwdr_cert: X509,
}

impl CertificateBundle {
    /// Load the bundle from environment variables or the configured directory.
    ///
    /// Returns `Ok(None)` when no certificate material is configured at all
    /// (the service then runs with signing disabled). A partial bundle is an
    /// error: signing with an incomplete chain produces passes Wallet rejects.
    pub fn load(config: &CertificatesConfig) -> Result<Option<Self>, CertificateError> {
        if let Some(bundle) = Self::load_from_env()? {
            info!("Using certificate bundle from environment variables");
            return Ok(Some(bundle));
        }

        Self::load_from_dir(&config.path)
    }

    fn load_from_env() -> Result<Option<Self>, CertificateError> {
        let cert = std::env::var("PASS_CERT_PEM").ok();
        let key = std::env::var("PASS_KEY_PEM").ok();
        let wwdr = std::env::var("WWDR_CERT_PEM").ok();

        match (cert, key, wwdr) {
            (None, None, None) => Ok(None),
            (Some(cert), Some(key), Some(wwdr)) => {
                let decode = |name: &str, value: &str| {
                    base64::engine::general_purpose::STANDARD
                        .decode(value)
                        .map_err(|e| CertificateError::Parse(format!("{}: {}", name, e)))
                };
                let bundle = Self::from_pems(
                    &decode("PASS_CERT_PEM", &cert)?,
                    &decode("PASS_KEY_PEM", &key)?,
                    &decode("WWDR_CERT_PEM", &wwdr)?,
                )?;
                Ok(Some(bundle))
            }
            _ => Err(CertificateError::Incomplete(
                "PASS_CERT_PEM, PASS_KEY_PEM and WWDR_CERT_PEM must all be set together"
                    .to_string(),
            )),
        }
    }

    fn load_from_dir(dir: &Path) -> Result<Option<Self>, CertificateError> {
        let cert_path = dir.join("pass.pem");
        let key_path = dir.join("key.pem");
        // Prefer the G4 intermediate, fall back to the older chain.
        let wwdr_g4 = dir.join("wwdrg4.pem");
        let wwdr_path = if wwdr_g4.exists() {
            wwdr_g4
        } else {
            dir.join("wwdr.pem")
        };

        let present = [&cert_path, &key_path, &wwdr_path]
            .iter()
            .filter(|p| p.exists())
            .count();

        if present == 0 {
            debug!("No certificate files in {}, signing disabled", dir.display());
            return Ok(None);
        }
        if present < 3 {
            return Err(CertificateError::Incomplete(format!(
                "need pass.pem, key.pem and wwdrg4.pem (or wwdr.pem) in {}",
                dir.display()
            )));
        }

        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| CertificateError::Io {
                path: path.display().to_string(),
                source: e,
            })
        };

        let bundle = Self::from_pems(&read(&cert_path)?, &read(&key_path)?, &read(&wwdr_path)?)?;
        info!("Loaded certificate bundle from {}", dir.display());
        Ok(Some(bundle))
    }

    /// Build a bundle from raw PEM bytes, checking the validity window.
    pub fn from_pems(
        cert_pem: &[u8],
        key_pem: &[u8],
        wwdr_pem: &[u8],
    ) -> Result<Self, CertificateError> {
        let pass_cert = X509::from_pem(cert_pem)
            .map_err(|e| CertificateError::Parse(format!("pass certificate: {}", e)))?;
        let private_key = PKey::private_key_from_pem(key_pem)
            .map_err(|e| CertificateError::Parse(format!("private key: {}", e)))?;
        let wwdr_cert = X509::from_pem(wwdr_pem)
            .map_err(|e| CertificateError::Parse(format!("WWDR certificate: {}", e)))?;

        check_validity_window(&pass_cert, "pass certificate")?;
        check_validity_window(&wwdr_cert, "WWDR certificate")?;

        Ok(Self {
            pass_cert,
            private_key,
            wwdr_cert,
        })
    }

    /// Extract passTypeIdentifier (UID) and teamIdentifier (OU) from the
    /// pass certificate subject. Returns None when either is absent.
    pub fn identifiers(&self) -> Option<PassIdentifiers> {
        let subject = self.pass_cert.subject_name();

        let get = |nid: Nid| {
            subject
                .entries_by_nid(nid)
                .next()
                .and_then(|entry| entry.data().as_utf8().ok())
                .map(|s| s.to_string())
        };

        let pass_type_identifier = get(Nid::USERID)?;
        let team_identifier = get(Nid::ORGANIZATIONALUNITNAME)?;

        Some(PassIdentifiers {
            pass_type_identifier,
            team_identifier,
        })
    }

    pub fn pass_cert(&self) -> &X509 {
        &self.pass_cert
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    pub fn wwdr_cert(&self) -> &X509 {
        &self.wwdr_cert
    }
}

fn check_validity_window(cert: &X509, label: &str) -> Result<(), CertificateError> {
    let now = Asn1Time::days_from_now(0)
        .map_err(|e| CertificateError::Parse(format!("{}: {}", label, e)))?;

    if cert.not_after() < &*now {
        return Err(CertificateError::Expired(label.to_string()));
    }
    if cert.not_before() > &*now {
        return Err(CertificateError::NotYetValid(label.to_string()));
    }

    Ok(())
}
