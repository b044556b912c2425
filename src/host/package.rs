use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::ProvisionError;

/// A primary package plus optional companions, each switched on or off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub name: String,
    pub other_packages: BTreeMap<String, bool>,
}

impl PackageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            other_packages: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_other(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.other_packages.insert(name.into(), enabled);
        self
    }

    /// The primary package followed by every enabled companion.
    #[must_use]
    pub fn package_list(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(
                self.other_packages
                    .iter()
                    .filter(|(_, enabled)| **enabled)
                    .map(|(name, _)| name.as_str()),
            )
            .collect()
    }
}

#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Install the requested packages.
    ///
    /// # Errors
    /// Returns `ProvisionError::InstallError` if the package manager fails.
    async fn install(&self, request: &PackageRequest) -> Result<(), ProvisionError>;
}

/// Debian/Ubuntu package manager driven through `apt-get`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptPackageManager;

#[async_trait]
impl PackageManager for AptPackageManager {
    async fn install(&self, request: &PackageRequest) -> Result<(), ProvisionError> {
        let packages = request.package_list();
        info!(packages = ?packages, "installing packages");

        let output = Command::new("apt-get")
            .args(["install", "-y"])
            .args(&packages)
            .env("DEBIAN_FRONTEND", "noninteractive")
            .output()
            .await
            .map_err(|e| ProvisionError::InstallError(format!("failed to spawn apt-get: {e}")))?;

        if !output.status.success() {
            return Err(ProvisionError::InstallError(format!(
                "apt-get install {} failed: {}",
                packages.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}
