use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{Reconciled, ResourceReconciler, SYSTEM_ACCOUNT};
use crate::error::ProvisionError;
use crate::host::shell_quote;
use crate::postgres::sql;

/// Ordered `CREATE DATABASE` modifiers.
///
/// Keys and values are appended verbatim (`KEY value`), so the caller is
/// responsible for quoting values such as encodings or locales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOptions {
    options: Vec<(String, String)>,
}

impl DatabaseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn owner(self, owner: impl Into<String>) -> Self {
        self.option("OWNER", owner)
    }

    #[must_use]
    pub fn encoding(self, encoding: impl Into<String>) -> Self {
        self.option("ENCODING", encoding)
    }

    #[must_use]
    pub fn template(self, template: impl Into<String>) -> Self {
        self.option("TEMPLATE", template)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DatabaseOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Result of the shell-side existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Present,
    Absent,
}

/// Interpret the line count printed by the probe pipeline.
///
/// # Errors
/// Returns `ProvisionError::CommandError` if the output is not a count.
pub fn parse_probe_output(stdout: &str) -> Result<ProbeOutcome, ProvisionError> {
    let count: u64 = stdout.trim().parse().map_err(|_| {
        ProvisionError::CommandError(format!(
            "unexpected database probe output: {:?}",
            stdout.trim()
        ))
    })?;
    Ok(if count >= 1 {
        ProbeOutcome::Present
    } else {
        ProbeOutcome::Absent
    })
}

impl ResourceReconciler {
    /// Create database `name` unless the advisory probe reports it present.
    ///
    /// The probe lists databases through `psql -l` outside the query session.
    /// If it fails, a warning is logged and the database is assumed absent.
    /// The probe is string based, so `CREATE DATABASE` can still fail (for
    /// example on a race); that failure is returned.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConnectionError` if the server is unreachable,
    /// or `ProvisionError::QueryError` if `CREATE DATABASE` fails.
    pub async fn ensure_database(
        &mut self,
        name: &str,
        options: DatabaseOptions,
    ) -> Result<Reconciled, ProvisionError> {
        let result = self.reconcile_database(name, &options).await;
        match &result {
            Ok(Reconciled::Created) => info!(database = name, "database created"),
            Ok(Reconciled::AlreadyPresent) => info!(database = name, "database already exists"),
            Err(e) => error!(
                operation = "ensure_database",
                resource = name,
                error = %e,
                "failed to ensure database"
            ),
        }
        result
    }

    async fn reconcile_database(
        &mut self,
        name: &str,
        options: &DatabaseOptions,
    ) -> Result<Reconciled, ProvisionError> {
        if self.probe_database(name).await == ProbeOutcome::Present {
            return Ok(Reconciled::AlreadyPresent);
        }

        let statement = sql::create_database(name, options);
        debug!(statement = %statement, "running query");
        self.session().await?.execute(&statement).await?;
        Ok(Reconciled::Created)
    }

    /// Advisory: any failure is downgraded to a warning and `Absent`.
    async fn probe_database(&self, name: &str) -> ProbeOutcome {
        let outcome = match self.host.shell.exec(&self.database_probe_command(name)).await {
            Ok(output) => parse_probe_output(&output.stdout),
            Err(e) => Err(e),
        };
        outcome.unwrap_or_else(|e| {
            warn!(
                operation = "ensure_database",
                resource = name,
                error = %e,
                "error checking if database exists, assuming it does not"
            );
            ProbeOutcome::Absent
        })
    }

    pub(crate) fn database_probe_command(&self, name: &str) -> String {
        format!(
            "sudo -u {SYSTEM_ACCOUNT} psql -p {} -lqtA | {}",
            self.spec.port,
            count_matching_names(name)
        )
    }
}

/// Pipeline stage counting listing rows whose first column is exactly `name`.
/// The name is matched as a fixed string, never as a pattern.
fn count_matching_names(name: &str) -> String {
    format!(
        "cut -d '|' -f 1 | grep -Fx -- {} | wc -l",
        shell_quote(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use crate::spec::ProvisionOptions;

    #[test]
    fn probe_output_is_a_line_count() {
        assert_eq!(parse_probe_output("1\n").unwrap(), ProbeOutcome::Present);
        assert_eq!(parse_probe_output("  0 ").unwrap(), ProbeOutcome::Absent);
        assert!(matches!(
            parse_probe_output("psql: error"),
            Err(ProvisionError::CommandError(_))
        ));
    }

    #[test]
    fn probe_command_matches_whole_names() {
        let reconciler = ResourceReconciler::new(ProvisionOptions::default(), Host::system());
        assert_eq!(
            reconciler.database_probe_command("app_db"),
            "sudo -u postgres psql -p 5432 -lqtA | cut -d '|' -f 1 | grep -Fx -- 'app_db' | wc -l"
        );
    }

    async fn count_in_listing(listing: &str, name: &str) -> ProbeOutcome {
        use crate::host::{ShellExecutor, SystemShell};

        let command = format!(
            "printf '%s' {} | {}",
            shell_quote(listing),
            count_matching_names(name)
        );
        let output = SystemShell.exec(&command).await.unwrap();
        parse_probe_output(&output.stdout).unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn regex_metacharacters_in_names_match_literally() {
        let listing = "appXdb|postgres|UTF8\npostgres|postgres|UTF8\n";
        assert_eq!(count_in_listing(listing, "app.db").await, ProbeOutcome::Absent);
        assert_eq!(count_in_listing(listing, "app.*").await, ProbeOutcome::Absent);
        assert_eq!(count_in_listing(listing, "appXdb").await, ProbeOutcome::Present);

        let dotted = "app.db|postgres|UTF8\n";
        assert_eq!(count_in_listing(dotted, "app.db").await, ProbeOutcome::Present);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn prefixes_do_not_count_as_matches() {
        let listing = "app_db2|postgres|UTF8\n";
        assert_eq!(count_in_listing(listing, "app_db").await, ProbeOutcome::Absent);
    }

    #[test]
    fn options_collect_from_pairs() {
        let options: DatabaseOptions = [("OWNER", "app"), ("ENCODING", "'UTF8'")]
            .into_iter()
            .collect();
        let pairs: Vec<_> = options.iter().collect();
        assert_eq!(pairs, vec![("OWNER", "app"), ("ENCODING", "'UTF8'")]);
    }
}
