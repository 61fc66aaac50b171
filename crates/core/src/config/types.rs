use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;
use crate::provision::ProvisionConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub certificates: CertificatesConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// External CLI tool to provision at startup (optional).
    #[serde(default)]
    pub tools: Option<ProvisionConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8000
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared API key; also settable via the API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("add2wallet.db")
}

/// Upload and artifact storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory where uploaded PDFs are staged.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Directory where generated .pkpass artifacts are kept.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            artifact_dir: default_artifact_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("passes")
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Certificate store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CertificatesConfig {
    /// Directory holding pass.pem, key.pem and wwdrg4.pem / wwdr.pem.
    /// PEM material in PASS_CERT_PEM / PASS_KEY_PEM / WWDR_CERT_PEM
    /// environment variables takes precedence over files.
    #[serde(default = "default_certificates_path")]
    pub path: PathBuf,
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            path: default_certificates_path(),
        }
    }
}

fn default_certificates_path() -> PathBuf {
    PathBuf::from("certificates")
}

/// Pass identity defaults, used when the certificate subject does not
/// provide passTypeIdentifier / teamIdentifier (e.g. unsigned dev mode).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
    #[serde(default = "default_pass_type_identifier")]
    pub pass_type_identifier: String,
    #[serde(default = "default_team_identifier")]
    pub team_identifier: String,
    #[serde(default = "default_organization_name")]
    pub organization_name: String,
    /// App Store id for associatedStoreIdentifiers (optional).
    #[serde(default)]
    pub app_store_id: Option<i64>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            pass_type_identifier: default_pass_type_identifier(),
            team_identifier: default_team_identifier(),
            organization_name: default_organization_name(),
            app_store_id: None,
        }
    }
}

fn default_pass_type_identifier() -> String {
    "pass.com.example.add2wallet".to_string()
}

fn default_team_identifier() -> String {
    "EXAMPLE10".to_string()
}

fn default_organization_name() -> String {
    "Add2Wallet".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub certificates: CertificatesConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            certificates: config.certificates.clone(),
            wallet: config.wallet.clone(),
        }
    }
}
