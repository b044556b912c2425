// Resource reconciler - drives the package, config files, roles and databases
// toward the declared spec
//
// - connection: lazily opened session and its state transitions
// - install: package install, password reset, config rendering
// - user: create-if-absent roles
// - database: advisory existence probe and create-if-absent databases

mod connection;
pub mod database;
mod install;
mod user;

use std::fmt;

use crate::host::Host;
use crate::spec::{ProvisionOptions, ProvisionSpec};

pub use connection::ConnectionState;
pub use database::DatabaseOptions;

use connection::Connection;

/// OS account the server runs as; privileged commands run through `sudo -u`.
pub const SYSTEM_ACCOUNT: &str = "postgres";

/// Service unit restarted after new configuration is written.
pub const SERVICE_NAME: &str = "postgresql";

/// Package installed alongside the server when contrib is enabled.
pub const CONTRIB_PACKAGE: &str = "postgresql-contrib";

/// What an ensure operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Created,
    AlreadyPresent,
}

impl Reconciled {
    #[must_use]
    pub fn is_created(self) -> bool {
        matches!(self, Reconciled::Created)
    }
}

impl fmt::Display for Reconciled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciled::Created => f.write_str("created"),
            Reconciled::AlreadyPresent => f.write_str("already present"),
        }
    }
}

/// Brings a PostgreSQL installation and its roles and databases into the
/// declared state.
///
/// Every operation is safe to repeat. Role and database state is never
/// cached; existence is checked live each time.
///
/// ```rust,no_run
/// use pg_provision::prelude::*;
///
/// # async fn run() -> Result<(), ProvisionError> {
/// let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), Host::system());
/// reconciler.install().await?;
/// reconciler.configure().await?;
/// reconciler.ensure_user("app", "secret").await?;
/// reconciler
///     .ensure_database("app_db", DatabaseOptions::new().owner("app"))
///     .await?;
/// reconciler.close_connection().await;
/// # Ok(())
/// # }
/// ```
pub struct ResourceReconciler {
    spec: ProvisionSpec,
    host: Host,
    connection: Connection,
}

impl ResourceReconciler {
    /// Merge `options` onto the defaults. Performs no I/O.
    #[must_use]
    pub fn new(options: ProvisionOptions, host: Host) -> Self {
        Self::from_spec(ProvisionSpec::from_options(options), host)
    }

    #[must_use]
    pub fn from_spec(spec: ProvisionSpec, host: Host) -> Self {
        Self {
            spec,
            host,
            connection: Connection::Unconnected,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &ProvisionSpec {
        &self.spec
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }
}

impl fmt::Debug for ResourceReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceReconciler")
            .field("spec", &self.spec)
            .field("connection", &self.connection.state())
            .finish_non_exhaustive()
    }
}
