use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProvisionError;

/// Destination for rendered configuration artifacts.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    /// Write `contents` to `path`, replacing anything already there.
    ///
    /// # Errors
    /// Returns `ProvisionError::TemplateError` when the artifact cannot be written.
    async fn write(&self, path: &Path, contents: &str) -> Result<(), ProvisionError>;
}

/// Writes artifacts to the local filesystem, creating parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

#[async_trait]
impl ArtifactWriter for FsArtifactWriter {
    async fn write(&self, path: &Path, contents: &str) -> Result<(), ProvisionError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ProvisionError::TemplateError(format!(
                    "cannot create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        tokio::fs::write(path, contents).await.map_err(|e| {
            ProvisionError::TemplateError(format!("cannot write {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "artifact written");
        Ok(())
    }
}
