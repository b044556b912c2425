// Provisioning configuration - the merged, immutable view the reconciler works from
//
// - access: pg_hba records
// - options: caller overrides and their JSON loading

pub mod access;
pub mod options;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use access::{AccessRule, RuleType};
pub use options::ProvisionOptions;

pub const DEFAULT_VERSION: &str = "16";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;
pub const DEFAULT_SOCKET: &str = "/var/run/postgresql";
pub const DEFAULT_CONFIG_ROOT: &str = "/etc/postgresql";

/// Fully resolved provisioning configuration.
///
/// Built once from [`ProvisionOptions`]; there is no way to change it after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionSpec {
    pub version: String,
    pub install_contrib: bool,
    pub default_user: String,
    pub default_password: String,
    pub default_database: String,
    pub host: String,
    pub port: u16,
    pub listen_addresses: String,
    pub max_connections: u32,
    pub socket: String,
    pub log_prefix: String,
    pub access_rules: Vec<AccessRule>,
    pub config_root: PathBuf,
}

impl Default for ProvisionSpec {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            install_contrib: true,
            default_user: "postgres".to_string(),
            default_password: "postgres".to_string(),
            default_database: "postgres".to_string(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            listen_addresses: "localhost".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            socket: DEFAULT_SOCKET.to_string(),
            log_prefix: "%t ".to_string(),
            access_rules: vec![AccessRule::new(
                RuleType::Host,
                "all",
                "all",
                Some("10.0.2.2/24"),
                "trust",
            )],
            config_root: PathBuf::from(DEFAULT_CONFIG_ROOT),
        }
    }
}

impl ProvisionSpec {
    /// Merge caller overrides onto the defaults.
    #[must_use]
    pub fn from_options(options: ProvisionOptions) -> Self {
        let defaults = Self::default();
        Self {
            version: options.version.unwrap_or(defaults.version),
            install_contrib: options.install_contrib.unwrap_or(defaults.install_contrib),
            default_user: options.default_user.unwrap_or(defaults.default_user),
            default_password: options.default_password.unwrap_or(defaults.default_password),
            default_database: options.default_database.unwrap_or(defaults.default_database),
            host: options.host.unwrap_or(defaults.host),
            port: options.port.unwrap_or(defaults.port),
            listen_addresses: options.listen_addresses.unwrap_or(defaults.listen_addresses),
            max_connections: options.max_connections.unwrap_or(defaults.max_connections),
            socket: options.socket.unwrap_or(defaults.socket),
            log_prefix: options.log_prefix.unwrap_or(defaults.log_prefix),
            access_rules: options.access_rules.unwrap_or(defaults.access_rules),
            config_root: options.config_root.unwrap_or(defaults.config_root),
        }
    }

    /// OS package carrying the server binaries, e.g. `postgresql-16`.
    #[must_use]
    pub fn package_name(&self) -> String {
        format!("postgresql-{}", self.version)
    }

    /// Cluster configuration directory: `{config_root}/{version}/main`.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_root.join(&self.version).join("main")
    }

    #[must_use]
    pub fn server_config_path(&self) -> PathBuf {
        self.config_dir().join("postgresql.conf")
    }

    #[must_use]
    pub fn access_config_path(&self) -> PathBuf {
        self.config_dir().join("pg_hba.conf")
    }
}
