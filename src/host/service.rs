use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::ProvisionError;

#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Restart `service` so it picks up new configuration.
    ///
    /// # Errors
    /// Returns `ProvisionError::CommandError` if the restart fails.
    async fn restart(&self, service: &str) -> Result<(), ProvisionError>;
}

/// Controls units through `systemctl`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemdService;

#[async_trait]
impl ServiceManager for SystemdService {
    async fn restart(&self, service: &str) -> Result<(), ProvisionError> {
        info!(service, "restarting service");
        let output = Command::new("systemctl")
            .args(["restart", service])
            .output()
            .await
            .map_err(|e| ProvisionError::CommandError(format!("failed to spawn systemctl: {e}")))?;

        if !output.status.success() {
            return Err(ProvisionError::CommandError(format!(
                "systemctl restart {service} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}
