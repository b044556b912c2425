use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProvisionError;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs shell command lines on the target host.
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    /// Run `command` through the shell.
    ///
    /// # Errors
    /// Returns `ProvisionError::CommandError` if the command cannot be spawned
    /// or exits non-zero.
    async fn exec(&self, command: &str) -> Result<CommandOutput, ProvisionError>;
}

/// Executes through `sh -c` on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

#[async_trait]
impl ShellExecutor for SystemShell {
    async fn exec(&self, command: &str) -> Result<CommandOutput, ProvisionError> {
        debug!("exec via sh -c");
        let output = Command::new("sh")
            .args(["-c", command])
            .output()
            .await
            .map_err(|e| ProvisionError::CommandError(format!("failed to spawn sh: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ProvisionError::CommandError(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Wrap `raw` in single quotes for a POSIX shell.
///
/// ```rust
/// use pg_provision::host::shell_quote;
///
/// assert_eq!(shell_quote("it's"), r#"'it'\''s'"#);
/// ```
#[must_use]
pub fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}
