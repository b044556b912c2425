use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pg_provision::{DatabaseOptions, ProvisionError, ProvisionOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Idempotent PostgreSQL provisioning")]
pub(crate) struct Args {
    /// JSON file with provisioning overrides
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// PostgreSQL major version (overrides the config file)
    #[arg(long = "pg-version")]
    pub(crate) pg_version: Option<String>,
    /// Server port (overrides the config file)
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Also write log lines to this file
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(long, short)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Install the server package and reset the superuser password
    Install,
    /// Render postgresql.conf and pg_hba.conf and restart the service
    Configure,
    /// Create a role unless it already exists
    User { name: String, password: String },
    /// Create a database unless it already exists
    Database {
        name: String,
        /// Creation modifier as KEY=VALUE, e.g. OWNER=app (repeatable)
        #[arg(long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },
    /// Print the merged configuration as JSON
    ShowConfig,
}

impl Args {
    /// File overrides first, then command-line flags on top.
    pub(crate) fn provision_options(&self) -> Result<ProvisionOptions, ProvisionError> {
        let base = match &self.config {
            Some(path) => ProvisionOptions::from_json_file(path)?,
            None => ProvisionOptions::default(),
        };
        Ok(base.overlay(ProvisionOptions {
            version: self.pg_version.clone(),
            port: self.port,
            ..ProvisionOptions::default()
        }))
    }
}

pub(crate) fn database_options(pairs: &[(String, String)]) -> DatabaseOptions {
    pairs.iter().cloned().collect()
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.trim().to_uppercase(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs_upper_case_keys() {
        assert_eq!(
            parse_key_value("owner=app").unwrap(),
            ("OWNER".to_string(), "app".to_string())
        );
        assert_eq!(
            parse_key_value("ENCODING='UTF8'").unwrap(),
            ("ENCODING".to_string(), "'UTF8'".to_string())
        );
        assert!(parse_key_value("owner").is_err());
        assert!(parse_key_value("=app").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["pg-provision", "--port", "5433", "show-config"]);
        let options = args.provision_options().unwrap();
        assert_eq!(options.port, Some(5433));
        assert_eq!(options.version, None);
    }
}
