//! Packages pass files into a .pkpass archive.
//!
//! A .pkpass is a zip containing the pass files, a manifest.json mapping
//! each file name to its SHA-1 digest, and a detached PKCS#7 signature
//! over the manifest. Without a certificate bundle the archive is built
//! unsigned, which Wallet rejects but development tooling accepts.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::Arc;

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::certificates::CertificateBundle;

/// Error type for pass packaging.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Signing failed: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    #[error("Failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds and optionally signs .pkpass archives.
pub struct PassSigner {
    bundle: Option<Arc<CertificateBundle>>,
}

impl PassSigner {
    pub fn new(bundle: Option<Arc<CertificateBundle>>) -> Self {
        Self { bundle }
    }

    /// Whether a certificate bundle is available for signing.
    pub fn signing_enabled(&self) -> bool {
        self.bundle.is_some()
    }

    /// Package pass.json plus any asset files into a .pkpass archive.
    ///
    /// Hidden files are excluded from the manifest and the archive, matching
    /// what Wallet expects.
    pub fn package(
        &self,
        pass_json: &[u8],
        assets: &[(String, Vec<u8>)],
    ) -> Result<Vec<u8>, SignerError> {
        let mut files: Vec<(&str, &[u8])> = vec![("pass.json", pass_json)];
        for (name, bytes) in assets {
            if is_packaged_file(name) {
                files.push((name.as_str(), bytes.as_slice()));
            }
        }

        let manifest = build_manifest(&files);
        let manifest_json = serde_json::to_vec(&manifest)?;

        let signature = match self.bundle {
            Some(ref bundle) => Some(sign_manifest(bundle, &manifest_json)?),
            None => {
                debug!("No certificate bundle, producing unsigned archive");
                None
            }
        };

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &files {
            zip.start_file(*name, options)?;
            zip.write_all(bytes)?;
        }
        zip.start_file("manifest.json", options)?;
        zip.write_all(&manifest_json)?;
        if let Some(ref signature) = signature {
            zip.start_file("signature", options)?;
            zip.write_all(signature)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// manifest.json maps every packaged file name to its SHA-1 hex digest.
fn build_manifest(files: &[(&str, &[u8])]) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(name, bytes)| {
            let mut hasher = Sha1::new();
            hasher.update(bytes);
            (name.to_string(), hex_encode(&hasher.finalize()))
        })
        .collect()
}

/// Detached, binary PKCS#7 signature over the manifest bytes, with the
/// WWDR intermediate embedded in the chain.
fn sign_manifest(bundle: &CertificateBundle, manifest: &[u8]) -> Result<Vec<u8>, SignerError> {
    let mut chain = Stack::new()?;
    chain.push(bundle.wwdr_cert().clone())?;

    let pkcs7 = Pkcs7::sign(
        bundle.pass_cert(),
        bundle.private_key(),
        &chain,
        manifest,
        Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY,
    )?;

    Ok(pkcs7.to_der()?)
}

fn is_packaged_file(name: &str) -> bool {
    !name.starts_with('.') && name != "manifest.json" && name != "signature"
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::certs::{self_signed_bundle_pem, BundleOptions};
    use std::io::Read;

    fn read_archive(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            entries.insert(file.name().to_string(), content);
        }
        entries
    }

    fn signed_signer() -> PassSigner {
        let pems = self_signed_bundle_pem(BundleOptions::default());
        let bundle =
            CertificateBundle::from_pems(&pems.cert_pem, &pems.key_pem, &pems.wwdr_pem).unwrap();
        PassSigner::new(Some(Arc::new(bundle)))
    }

    #[test]
    fn test_unsigned_archive() {
        let signer = PassSigner::new(None);
        assert!(!signer.signing_enabled());

        let archive = signer.package(b"{\"formatVersion\":1}", &[]).unwrap();
        let entries = read_archive(&archive);

        assert!(entries.contains_key("pass.json"));
        assert!(entries.contains_key("manifest.json"));
        assert!(!entries.contains_key("signature"));
    }

    #[test]
    fn test_signed_archive() {
        let signer = signed_signer();
        assert!(signer.signing_enabled());

        let archive = signer.package(b"{\"formatVersion\":1}", &[]).unwrap();
        let entries = read_archive(&archive);

        assert!(entries.contains_key("signature"));
        // DER-encoded PKCS#7 starts with a SEQUENCE tag.
        assert_eq!(entries["signature"][0], 0x30);
    }

    #[test]
    fn test_manifest_digests() {
        let signer = PassSigner::new(None);
        let pass_json = b"{\"formatVersion\":1}";
        let archive = signer
            .package(pass_json, &[("icon.png".to_string(), vec![1, 2, 3])])
            .unwrap();
        let entries = read_archive(&archive);

        let manifest: BTreeMap<String, String> =
            serde_json::from_slice(&entries["manifest.json"]).unwrap();

        let mut hasher = Sha1::new();
        hasher.update(pass_json);
        assert_eq!(manifest["pass.json"], hex_encode(&hasher.finalize()));
        assert!(manifest.contains_key("icon.png"));
        assert!(!manifest.contains_key("manifest.json"));
    }

    #[test]
    fn test_hidden_files_excluded() {
        let signer = PassSigner::new(None);
        let archive = signer
            .package(b"{}", &[(".DS_Store".to_string(), vec![0])])
            .unwrap();
        let entries = read_archive(&archive);

        assert!(!entries.contains_key(".DS_Store"));
    }

    #[test]
    fn test_signature_verifies_chain_subject() {
        let signer = signed_signer();
        let archive = signer.package(b"{}", &[]).unwrap();
        let entries = read_archive(&archive);

        let pkcs7 = Pkcs7::from_der(&entries["signature"]).unwrap();
        // Round-trips through DER without loss.
        assert!(!pkcs7.to_der().unwrap().is_empty());
    }
}
