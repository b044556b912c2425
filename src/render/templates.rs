use askama::Template;

use crate::spec::{AccessRule, ProvisionSpec};

#[derive(Template)]
#[template(path = "postgresql.conf", escape = "none")]
pub(crate) struct ServerConfigTemplate {
    data_directory: String,
    hba_file: String,
    ident_file: String,
    pid_file: String,
    listen_addresses: String,
    port: u16,
    max_connections: u32,
    socket: String,
    log_prefix: String,
}

impl ServerConfigTemplate {
    pub(crate) fn new(spec: &ProvisionSpec) -> Self {
        let config_dir = spec.config_dir();
        Self {
            data_directory: quote_value(&format!("/var/lib/postgresql/{}/main", spec.version)),
            hba_file: quote_value(&spec.access_config_path().to_string_lossy()),
            ident_file: quote_value(&config_dir.join("pg_ident.conf").to_string_lossy()),
            pid_file: quote_value(&format!("{}/{}-main.pid", spec.socket, spec.version)),
            listen_addresses: quote_value(&spec.listen_addresses),
            port: spec.port,
            max_connections: spec.max_connections,
            socket: quote_value(&spec.socket),
            log_prefix: quote_value(&spec.log_prefix),
        }
    }
}

#[derive(Template)]
#[template(path = "pg_hba.conf", escape = "none")]
pub(crate) struct AccessConfigTemplate<'a> {
    rules: &'a [AccessRule],
}

impl<'a> AccessConfigTemplate<'a> {
    pub(crate) fn new(spec: &'a ProvisionSpec) -> Self {
        Self {
            rules: &spec.access_rules,
        }
    }
}

/// Escape a value for use between single quotes in `postgresql.conf`.
fn quote_value(raw: &str) -> String {
    raw.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_value_doubles_single_quotes() {
        assert_eq!(quote_value("%t 'x' "), "%t ''x'' ");
    }
}
