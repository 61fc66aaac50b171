//! The fallback chain that drives install methods in order.

use thiserror::Error;
use tracing::{info, warn};

use crate::metrics;

use super::config::ProvisionConfig;
use super::methods::{
    CommandProbe, DirectDownload, InstallMethod, OfficialInstaller, PackageManagerInstall,
    ToolProbe,
};

/// Error type for chain execution.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("All install methods failed for {tool}: {}", attempts.join("; "))]
    AllMethodsFailed {
        tool: String,
        attempts: Vec<String>,
    },
}

/// How the tool ended up invocable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The tool was already on the host.
    AlreadyInstalled,
    /// Installed by the named method.
    Installed { method: String },
}

/// Tries install methods in configured order until the tool is invocable.
///
/// Each method gets exactly one attempt. Methods whose prerequisites are
/// missing (e.g. the package manager itself) are skipped rather than
/// counted as failures. The first method that leaves the tool invocable
/// wins and later methods never run.
pub struct ProvisionChain {
    tool: String,
    methods: Vec<Box<dyn InstallMethod>>,
    probe: Box<dyn ToolProbe>,
}

impl ProvisionChain {
    /// Build the chain from configuration: official installer, package
    /// manager, direct download, in that order.
    pub fn from_config(config: &ProvisionConfig) -> Self {
        let mut methods: Vec<Box<dyn InstallMethod>> = Vec::new();
        if let Some(ref installer) = config.installer {
            methods.push(Box::new(OfficialInstaller::new(installer.clone())));
        }
        if let Some(ref package) = config.package {
            methods.push(Box::new(PackageManagerInstall::new(package.clone())));
        }
        if let Some(ref download) = config.download {
            methods.push(Box::new(DirectDownload::new(
                config.tool.clone(),
                download.clone(),
            )));
        }

        Self {
            tool: config.tool.clone(),
            methods,
            probe: Box::new(CommandProbe),
        }
    }

    pub fn new(
        tool: impl Into<String>,
        methods: Vec<Box<dyn InstallMethod>>,
        probe: Box<dyn ToolProbe>,
    ) -> Self {
        Self {
            tool: tool.into(),
            methods,
            probe,
        }
    }

    /// Make sure the tool is invocable, installing it if necessary.
    pub async fn ensure(&self) -> Result<ProvisionOutcome, ProvisionError> {
        if self.probe.invocable(&self.tool).await {
            info!(tool = %self.tool, "Tool already installed");
            return Ok(ProvisionOutcome::AlreadyInstalled);
        }

        let mut attempts = Vec::new();

        for method in &self.methods {
            if !method.available().await {
                info!(tool = %self.tool, method = method.name(), "Method unavailable, skipping");
                metrics::PROVISION_ATTEMPTS
                    .with_label_values(&[method.name(), "unavailable"])
                    .inc();
                continue;
            }

            match method.install().await {
                Ok(()) => {
                    if self.probe.invocable(&self.tool).await {
                        info!(tool = %self.tool, method = method.name(), "Tool installed");
                        metrics::PROVISION_ATTEMPTS
                            .with_label_values(&[method.name(), "success"])
                            .inc();
                        return Ok(ProvisionOutcome::Installed {
                            method: method.name().to_string(),
                        });
                    }
                    warn!(
                        tool = %self.tool,
                        method = method.name(),
                        "Install reported success but tool is not invocable"
                    );
                    metrics::PROVISION_ATTEMPTS
                        .with_label_values(&[method.name(), "failed"])
                        .inc();
                    attempts.push(format!("{}: tool not invocable after install", method.name()));
                }
                Err(e) => {
                    warn!(tool = %self.tool, method = method.name(), error = %e, "Install failed");
                    metrics::PROVISION_ATTEMPTS
                        .with_label_values(&[method.name(), "failed"])
                        .inc();
                    attempts.push(format!("{}: {}", method.name(), e));
                }
            }
        }

        if attempts.is_empty() {
            attempts.push("no install method was available".to_string());
        }

        Err(ProvisionError::AllMethodsFailed {
            tool: self.tool.clone(),
            attempts,
        })
    }
}
