//! Self-signed certificate fixtures for signing tests.
//!
//! Real Pass Type ID certificates cannot ship with the repo, so tests
//! generate throwaway self-signed material with the same subject shape
//! (UID = passTypeIdentifier, OU = teamIdentifier).

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Name, X509NameBuilder, X509};

/// Options for the generated bundle.
pub struct BundleOptions {
    pub pass_type_identifier: Option<String>,
    pub team_identifier: Option<String>,
    /// Generate a certificate whose validity window is entirely in the past.
    pub expired: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            pass_type_identifier: Some("pass.com.example.test".to_string()),
            team_identifier: Some("TEAM999999".to_string()),
            expired: false,
        }
    }
}

/// PEM-encoded test bundle.
pub struct BundlePem {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
    pub wwdr_pem: Vec<u8>,
}

/// Generate a self-signed pass certificate plus a stand-in WWDR certificate.
pub fn self_signed_bundle_pem(options: BundleOptions) -> BundlePem {
    let key = generate_key();
    let subject = pass_subject(&options);
    let cert = self_signed_cert(&key, &subject, options.expired);

    let wwdr_key = generate_key();
    let mut wwdr_name = X509NameBuilder::new().unwrap();
    wwdr_name
        .append_entry_by_nid(Nid::COMMONNAME, "Test Worldwide Developer Relations CA")
        .unwrap();
    let wwdr_cert = self_signed_cert(&wwdr_key, &wwdr_name.build(), false);

    BundlePem {
        cert_pem: cert.to_pem().unwrap(),
        key_pem: key.private_key_to_pem_pkcs8().unwrap(),
        wwdr_pem: wwdr_cert.to_pem().unwrap(),
    }
}

fn generate_key() -> PKey<Private> {
    let rsa = Rsa::generate(2048).unwrap();
    PKey::from_rsa(rsa).unwrap()
}

fn pass_subject(options: &BundleOptions) -> X509Name {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "Pass Type ID: test")
        .unwrap();
    if let Some(ref uid) = options.pass_type_identifier {
        name.append_entry_by_nid(Nid::USERID, uid).unwrap();
    }
    if let Some(ref ou) = options.team_identifier {
        name.append_entry_by_nid(Nid::ORGANIZATIONALUNITNAME, ou)
            .unwrap();
    }
    name.build()
}

fn self_signed_cert(key: &PKey<Private>, subject: &X509Name, expired: bool) -> X509 {
    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_subject_name(subject).unwrap();
    builder.set_issuer_name(subject).unwrap();
    builder.set_pubkey(key).unwrap();

    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();

    if expired {
        let now = chrono::Utc::now().timestamp();
        let not_before = Asn1Time::from_unix(now - 172_800).unwrap();
        let not_after = Asn1Time::from_unix(now - 86_400).unwrap();
        builder.set_not_before(&not_before).unwrap();
        builder.set_not_after(&not_after).unwrap();
    } else {
        let not_before = Asn1Time::days_from_now(0).unwrap();
        let not_after = Asn1Time::days_from_now(365).unwrap();
        builder.set_not_before(&not_before).unwrap();
        builder.set_not_after(&not_after).unwrap();
    }

    builder.sign(key, MessageDigest::sha256()).unwrap();
    builder.build()
}
