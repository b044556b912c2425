use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::access::AccessRule;
use crate::error::ProvisionError;

/// Caller overrides for a [`ProvisionSpec`](super::ProvisionSpec).
///
/// Every field is optional; anything left as `None` falls back to the
/// built-in default when the spec is built.
///
/// ```rust
/// use pg_provision::prelude::*;
///
/// let spec = ProvisionSpec::from_options(ProvisionOptions {
///     port: Some(5433),
///     ..ProvisionOptions::default()
/// });
/// assert_eq!(spec.port, 5433);
/// assert_eq!(spec.default_user, "postgres");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionOptions {
    pub version: Option<String>,
    pub install_contrib: Option<bool>,
    pub default_user: Option<String>,
    pub default_password: Option<String>,
    pub default_database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub listen_addresses: Option<String>,
    pub max_connections: Option<u32>,
    pub socket: Option<String>,
    pub log_prefix: Option<String>,
    pub access_rules: Option<Vec<AccessRule>>,
    pub config_root: Option<PathBuf>,
}

impl ProvisionOptions {
    /// Parse overrides from a JSON document.
    ///
    /// # Errors
    /// Returns `ProvisionError::JsonError` on malformed input or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ProvisionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read overrides from a JSON file.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConfigError` if the file cannot be read, or
    /// `ProvisionError::JsonError` if it does not parse.
    pub fn from_json_file(path: &Path) -> Result<Self, ProvisionError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn overlay(self, other: ProvisionOptions) -> ProvisionOptions {
        ProvisionOptions {
            version: other.version.or(self.version),
            install_contrib: other.install_contrib.or(self.install_contrib),
            default_user: other.default_user.or(self.default_user),
            default_password: other.default_password.or(self.default_password),
            default_database: other.default_database.or(self.default_database),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            listen_addresses: other.listen_addresses.or(self.listen_addresses),
            max_connections: other.max_connections.or(self.max_connections),
            socket: other.socket.or(self.socket),
            log_prefix: other.log_prefix.or(self.log_prefix),
            access_rules: other.access_rules.or(self.access_rules),
            config_root: other.config_root.or(self.config_root),
        }
    }
}
