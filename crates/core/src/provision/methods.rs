//! Install methods for the provisioning chain.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::config::{CommandSpec, DownloadSpec, PackageSpec};

/// Error type for a single install attempt.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },

    #[error("Release metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Release metadata unusable: {0}")]
    Metadata(String),

    #[error("Failed to unpack archive: {0}")]
    Archive(String),

    #[error("Failed to write binary: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks whether a tool can actually be invoked.
#[async_trait]
pub trait ToolProbe: Send + Sync {
    async fn invocable(&self, tool: &str) -> bool;
}

/// Probe that runs `{tool} --version`.
pub struct CommandProbe;

#[async_trait]
impl ToolProbe for CommandProbe {
    async fn invocable(&self, tool: &str) -> bool {
        tokio::process::Command::new(tool)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// One way of installing a tool.
#[async_trait]
pub trait InstallMethod: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this method can run at all on this host. Unavailable
    /// methods are skipped without counting as a failure.
    async fn available(&self) -> bool;

    async fn install(&self) -> Result<(), InstallError>;
}

/// Runs the vendor's official installer command.
pub struct OfficialInstaller {
    command: CommandSpec,
}

impl OfficialInstaller {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }
}

#[async_trait]
impl InstallMethod for OfficialInstaller {
    fn name(&self) -> &str {
        "official_installer"
    }

    async fn available(&self) -> bool {
        binary_on_path(&self.command.program)
    }

    async fn install(&self) -> Result<(), InstallError> {
        info!(program = %self.command.program, "Running official installer");
        run_command(&self.command.program, &self.command.args).await
    }
}

/// Installs through a system package manager.
pub struct PackageManagerInstall {
    spec: PackageSpec,
}

impl PackageManagerInstall {
    pub fn new(spec: PackageSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl InstallMethod for PackageManagerInstall {
    fn name(&self) -> &str {
        "package_manager"
    }

    async fn available(&self) -> bool {
        binary_on_path(&self.spec.manager)
    }

    async fn install(&self) -> Result<(), InstallError> {
        info!(
            manager = %self.spec.manager,
            package = %self.spec.name,
            "Installing via package manager"
        );
        let mut args = self.spec.args.clone();
        args.push(self.spec.name.clone());
        run_command(&self.spec.manager, &args).await
    }
}

/// Downloads a prebuilt binary from a release endpoint.
pub struct DirectDownload {
    tool: String,
    spec: DownloadSpec,
    client: reqwest::Client,
}

impl DirectDownload {
    pub fn new(tool: String, spec: DownloadSpec) -> Self {
        Self {
            tool,
            spec,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl InstallMethod for DirectDownload {
    fn name(&self) -> &str {
        "direct_download"
    }

    async fn available(&self) -> bool {
        true
    }

    async fn install(&self) -> Result<(), InstallError> {
        let metadata: serde_json::Value = self
            .client
            .get(&self.spec.version_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // An unusable version means we bail before transferring anything.
        let version = parse_version(&metadata)
            .ok_or_else(|| InstallError::Metadata("no version in release metadata".to_string()))?;

        let url = render_url(&self.spec.url_template, &version);
        info!(tool = %self.tool, version = %version, url = %url, "Downloading binary");

        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let binary = unpack_binary(&bytes, &self.tool)?;

        tokio::fs::create_dir_all(&self.spec.install_dir).await?;
        let dest = self.spec.install_dir.join(&self.tool);
        tokio::fs::write(&dest, &binary).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).await?;
        }

        debug!(dest = %dest.display(), "Installed binary");
        Ok(())
    }
}

/// Version from release metadata; empty or missing is unusable.
pub(super) fn parse_version(metadata: &serde_json::Value) -> Option<String> {
    metadata
        .get("version")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(super) fn render_url(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Archived releases are unpacked and the tool binary pulled out of them;
/// anything else is taken as the raw binary.
pub(super) fn unpack_binary(bytes: &[u8], tool: &str) -> Result<Vec<u8>, InstallError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| InstallError::Archive(e.to_string()))?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| InstallError::Archive(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        if entry.name().rsplit('/').next() == Some(tool) {
            let mut binary = Vec::with_capacity(entry.size() as usize);
            std::io::Read::read_to_end(&mut entry, &mut binary)?;
            return Ok(binary);
        }
    }

    Err(InstallError::Archive(format!(
        "{} not found in archive",
        tool
    )))
}

async fn run_command(program: &str, args: &[String]) -> Result<(), InstallError> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| InstallError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(InstallError::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
        })
    }
}

fn binary_on_path(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).is_file();
    }
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(program).is_file())
}
