// Host capabilities - the collaborators the reconciler delegates to
//
// - package: OS package installation
// - service: service restarts
// - shell: command execution

pub mod package;
pub mod service;
pub mod shell;

use std::sync::Arc;

use crate::postgres::{PgConnector, QueryConnector};
use crate::render::{ArtifactWriter, FsArtifactWriter};

pub use package::{AptPackageManager, PackageManager, PackageRequest};
pub use service::{ServiceManager, SystemdService};
pub use shell::{CommandOutput, ShellExecutor, SystemShell, shell_quote};

/// The set of capabilities a reconciler is composed from.
#[derive(Clone)]
pub struct Host {
    pub packages: Arc<dyn PackageManager>,
    pub services: Arc<dyn ServiceManager>,
    pub shell: Arc<dyn ShellExecutor>,
    pub writer: Arc<dyn ArtifactWriter>,
    pub connector: Arc<dyn QueryConnector>,
}

impl Host {
    /// Production wiring: apt-get, systemctl, `sh -c`, the local filesystem
    /// and tokio-postgres.
    #[must_use]
    pub fn system() -> Self {
        Self {
            packages: Arc::new(AptPackageManager),
            services: Arc::new(SystemdService),
            shell: Arc::new(SystemShell),
            writer: Arc::new(FsArtifactWriter),
            connector: Arc::new(PgConnector),
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
