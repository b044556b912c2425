use std::path::Path;

use tracing::{error, info};

use super::{CONTRIB_PACKAGE, ResourceReconciler, SERVICE_NAME, SYSTEM_ACCOUNT};
use crate::error::ProvisionError;
use crate::host::{PackageRequest, shell_quote};
use crate::postgres::sql;
use crate::render::{
    ArtifactWriter, RenderedArtifact, render_access_config, render_server_config,
};

impl ResourceReconciler {
    /// Install the server package, then reset the superuser password.
    ///
    /// The password reset only runs once the package install has succeeded.
    ///
    /// # Errors
    /// Returns `ProvisionError::InstallError` from the package manager or
    /// `ProvisionError::CommandError` from the password reset.
    pub async fn install(&self) -> Result<(), ProvisionError> {
        let request = PackageRequest::new(self.spec.package_name())
            .with_other(CONTRIB_PACKAGE, self.spec.install_contrib);

        if let Err(e) = self.host.packages.install(&request).await {
            error!(
                operation = "install",
                resource = %request.name,
                error = %e,
                "failed to install PostgreSQL"
            );
            return Err(e);
        }

        if let Err(e) = self.host.shell.exec(&self.password_reset_command()).await {
            error!(
                operation = "install",
                resource = %self.spec.default_user,
                error = %e,
                "failed to reset superuser password"
            );
            return Err(e);
        }

        info!(package = %request.name, "PostgreSQL installed");
        Ok(())
    }

    /// Render `postgresql.conf` and `pg_hba.conf` and write both concurrently.
    ///
    /// Succeeds only if both files are written; the first failure is returned
    /// after every failure has been logged.
    ///
    /// # Errors
    /// Returns `ProvisionError::TemplateError` if either artifact fails.
    pub async fn render_configuration(&self) -> Result<(), ProvisionError> {
        let writer = self.host.writer.as_ref();
        let server_path = self.spec.server_config_path();
        let access_path = self.spec.access_config_path();
        let (server, access) = tokio::join!(
            write_artifact(writer, &server_path, render_server_config(&self.spec)),
            write_artifact(writer, &access_path, render_access_config(&self.spec)),
        );
        server.and(access)
    }

    /// Write fresh configuration and restart the service to apply it.
    ///
    /// # Errors
    /// Returns the rendering failure, or `ProvisionError::CommandError` if the
    /// restart fails. The service is not touched when rendering fails.
    pub async fn configure(&self) -> Result<(), ProvisionError> {
        self.render_configuration().await?;

        if let Err(e) = self.host.services.restart(SERVICE_NAME).await {
            error!(
                operation = "configure",
                resource = SERVICE_NAME,
                error = %e,
                "failed to restart service"
            );
            return Err(e);
        }

        info!(
            config_dir = %self.spec.config_dir().display(),
            "PostgreSQL configured"
        );
        Ok(())
    }

    pub(crate) fn password_reset_command(&self) -> String {
        let statement = sql::alter_user_password(&self.spec.default_user, &self.spec.default_password);
        format!(
            "sudo -u {SYSTEM_ACCOUNT} psql -p {} -c {}",
            self.spec.port,
            shell_quote(&statement)
        )
    }
}

/// `path` names the artifact in logs even when rendering fails before a
/// `RenderedArtifact` exists.
async fn write_artifact(
    writer: &dyn ArtifactWriter,
    path: &Path,
    artifact: Result<RenderedArtifact, ProvisionError>,
) -> Result<(), ProvisionError> {
    let result = match artifact {
        Ok(artifact) => writer.write(&artifact.path, &artifact.contents).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        error!(
            operation = "render_configuration",
            resource = %path.display(),
            error = %e,
            "failed to render configuration"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::host::Host;
    use crate::reconciler::ResourceReconciler;
    use crate::spec::ProvisionOptions;

    #[test]
    fn password_reset_targets_configured_port_and_user() {
        let reconciler = ResourceReconciler::new(
            ProvisionOptions {
                port: Some(5433),
                default_password: Some("s3'cret".into()),
                ..ProvisionOptions::default()
            },
            Host::system(),
        );
        assert_eq!(
            reconciler.password_reset_command(),
            r#"sudo -u postgres psql -p 5433 -c 'ALTER USER postgres WITH PASSWORD '\''s3'\'''\''cret'\'';'"#
        );
    }
}
