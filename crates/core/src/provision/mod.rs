//! Startup provisioning for external CLI tools.
//!
//! Some deployments depend on a vendor CLI that is not guaranteed to be on
//! the host. The chain probes for it and walks a configured list of install
//! methods until one leaves it invocable.

mod chain;
mod config;
mod methods;

pub use chain::{ProvisionChain, ProvisionError, ProvisionOutcome};
pub use config::{CommandSpec, DownloadSpec, PackageSpec, ProvisionConfig};
pub use methods::{
    CommandProbe, DirectDownload, InstallError, InstallMethod, OfficialInstaller,
    PackageManagerInstall, ToolProbe,
};
