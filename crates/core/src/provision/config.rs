//! Tool provisioning configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An external CLI tool the service needs at runtime, plus the fallback
/// chain used to install it when it is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Binary name that must become invocable on PATH.
    pub tool: String,
    /// Vendor's official installer command, tried first.
    #[serde(default)]
    pub installer: Option<CommandSpec>,
    /// System package manager fallback.
    #[serde(default)]
    pub package: Option<PackageSpec>,
    /// Direct-download fallback, tried last.
    #[serde(default)]
    pub download: Option<DownloadSpec>,
}

/// A program invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Install through a system package manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Manager binary, e.g. "brew" or "apt-get". The method is skipped
    /// when the manager itself is not installed.
    pub manager: String,
    /// Package name to install.
    pub name: String,
    /// Arguments placed before the package name.
    #[serde(default = "default_package_args")]
    pub args: Vec<String>,
}

fn default_package_args() -> Vec<String> {
    vec!["install".to_string()]
}

/// Download a prebuilt binary directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSpec {
    /// JSON endpoint describing the latest release, e.g.
    /// `{"version": "1.2.3"}`.
    pub version_url: String,
    /// Download URL template; `{version}` is replaced with the resolved
    /// version. May point at a zip archive containing the tool or at the
    /// raw binary.
    pub url_template: String,
    /// Directory the binary is written into.
    pub install_dir: PathBuf,
}
