use serde::Serialize;

use crate::error::ProvisionError;
use crate::spec::ProvisionSpec;

/// Credentials and address the reconciler connects with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub dbname: String,
}

impl ConnectParams {
    #[must_use]
    pub fn from_spec(spec: &ProvisionSpec) -> Self {
        Self {
            host: spec.host.clone(),
            port: spec.port,
            user: spec.default_user.clone(),
            password: spec.default_password.clone(),
            dbname: spec.default_database.clone(),
        }
    }

    /// Check that every field needed to connect is present.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.host.is_empty() {
            return Err(ProvisionError::ConfigError("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(ProvisionError::ConfigError("port is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(ProvisionError::ConfigError("user is required".to_string()));
        }
        if self.dbname.is_empty() {
            return Err(ProvisionError::ConfigError(
                "dbname is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Driver configuration for `tokio_postgres`.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConfigError` if validation fails.
    pub fn to_pg_config(&self) -> Result<tokio_postgres::Config, ProvisionError> {
        self.validate()?;
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .application_name("pg-provision");
        Ok(config)
    }
}
