//! Recording stand-ins for every host capability.
//!
//! A [`FakeHost`] hands out a [`Host`] whose collaborators record each call
//! and can be told to fail, so reconciler behavior can be asserted without a
//! package manager, a shell or a database server.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ProvisionError;
use crate::host::{CommandOutput, Host, PackageManager, PackageRequest, ServiceManager, ShellExecutor};
use crate::postgres::{ConnectParams, QueryConnector, QuerySession, sql};
use crate::render::ArtifactWriter;

#[derive(Default)]
pub struct FakePackageManager {
    pub installs: Mutex<Vec<PackageRequest>>,
    pub fail: Mutex<Option<String>>,
}

#[async_trait]
impl PackageManager for FakePackageManager {
    async fn install(&self, request: &PackageRequest) -> Result<(), ProvisionError> {
        self.installs.lock().expect("installs lock").push(request.clone());
        match self.fail.lock().expect("fail lock").clone() {
            Some(reason) => Err(ProvisionError::InstallError(reason)),
            None => Ok(()),
        }
    }
}

/// Replies to commands by substring match; unmatched commands succeed with
/// empty output.
#[derive(Default)]
pub struct FakeShell {
    pub commands: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, Result<String, String>)>>,
}

impl FakeShell {
    /// Answer any command containing `pattern` with `stdout`.
    pub fn reply(&self, pattern: &str, stdout: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push((pattern.to_string(), Ok(stdout.to_string())));
    }

    /// Fail any command containing `pattern` with `stderr`.
    pub fn fail(&self, pattern: &str, stderr: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push((pattern.to_string(), Err(stderr.to_string())));
    }

    #[must_use]
    pub fn commands_containing(&self, pattern: &str) -> Vec<String> {
        self.commands
            .lock()
            .expect("commands lock")
            .iter()
            .filter(|c| c.contains(pattern))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ShellExecutor for FakeShell {
    async fn exec(&self, command: &str) -> Result<CommandOutput, ProvisionError> {
        self.commands.lock().expect("commands lock").push(command.to_string());
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());
        match reply {
            Some(Ok(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Some(Err(stderr)) => Err(ProvisionError::CommandError(format!(
                "exited with exit status: 1: {stderr}"
            ))),
            None => Ok(CommandOutput::default()),
        }
    }
}

#[derive(Default)]
pub struct FakeServiceManager {
    pub restarts: Mutex<Vec<String>>,
    pub fail: Mutex<Option<String>>,
}

#[async_trait]
impl ServiceManager for FakeServiceManager {
    async fn restart(&self, service: &str) -> Result<(), ProvisionError> {
        self.restarts.lock().expect("restarts lock").push(service.to_string());
        match self.fail.lock().expect("fail lock").clone() {
            Some(reason) => Err(ProvisionError::CommandError(reason)),
            None => Ok(()),
        }
    }
}

/// Keeps written artifacts in memory.
#[derive(Default)]
pub struct FakeWriter {
    pub files: Mutex<BTreeMap<PathBuf, String>>,
    pub fail_paths: Mutex<BTreeSet<PathBuf>>,
}

impl FakeWriter {
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("files lock").get(path).cloned()
    }
}

#[async_trait]
impl ArtifactWriter for FakeWriter {
    async fn write(&self, path: &Path, contents: &str) -> Result<(), ProvisionError> {
        if self.fail_paths.lock().expect("fail lock").contains(path) {
            return Err(ProvisionError::TemplateError(format!(
                "cannot write {}",
                path.display()
            )));
        }
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// Server-side state shared by every session a [`FakeConnector`] opens.
#[derive(Default)]
pub struct FakeServer {
    pub roles: Mutex<BTreeSet<String>>,
    pub statements: Mutex<Vec<String>>,
    /// Statements starting with any of these prefixes are rejected.
    pub reject_prefixes: Mutex<Vec<String>>,
    pub lookup_error: Mutex<Option<String>>,
}

impl FakeServer {
    #[must_use]
    pub fn statements_starting_with(&self, prefix: &str) -> Vec<String> {
        self.statements
            .lock()
            .expect("statements lock")
            .iter()
            .filter(|s| s.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn reject(&self, prefix: &str) {
        self.reject_prefixes
            .lock()
            .expect("reject lock")
            .push(prefix.to_string());
    }
}

#[derive(Default)]
pub struct FakeConnector {
    pub server: Arc<FakeServer>,
    pub connect_attempts: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub fail_connect: Mutex<Option<String>>,
    pub last_params: Mutex<Option<ConnectParams>>,
}

impl FakeConnector {
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryConnector for FakeConnector {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn QuerySession>, ProvisionError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().expect("params lock") = Some(params.clone());
        if let Some(reason) = self.fail_connect.lock().expect("fail lock").clone() {
            return Err(ProvisionError::ConnectionError(reason));
        }
        Ok(Box::new(FakeSession {
            server: Arc::clone(&self.server),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeSession {
    server: Arc<FakeServer>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl QuerySession for FakeSession {
    async fn query_count(&mut self, query: &str, params: &[&str]) -> Result<u64, ProvisionError> {
        if let Some(reason) = self.server.lookup_error.lock().expect("lookup lock").clone() {
            return Err(ProvisionError::QueryError(reason));
        }
        if query == sql::ROLE_EXISTS {
            let roles = self.server.roles.lock().expect("roles lock");
            return Ok(u64::from(params.first().is_some_and(|name| roles.contains(*name))));
        }
        Ok(0)
    }

    async fn execute(&mut self, statement: &str) -> Result<(), ProvisionError> {
        self.server
            .statements
            .lock()
            .expect("statements lock")
            .push(statement.to_string());

        let rejected = self
            .server
            .reject_prefixes
            .lock()
            .expect("reject lock")
            .iter()
            .any(|prefix| statement.starts_with(prefix.as_str()));
        if rejected {
            return Err(ProvisionError::QueryError(format!("rejected: {statement}")));
        }

        if let Some(rest) = statement.strip_prefix("CREATE USER ") {
            if let Some(name) = rest.split_whitespace().next() {
                self.server
                    .roles
                    .lock()
                    .expect("roles lock")
                    .insert(name.trim_matches('"').to_string());
            }
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Every fake, plus the [`Host`] wired from them.
#[derive(Default, Clone)]
pub struct FakeHost {
    pub packages: Arc<FakePackageManager>,
    pub services: Arc<FakeServiceManager>,
    pub shell: Arc<FakeShell>,
    pub writer: Arc<FakeWriter>,
    pub connector: Arc<FakeConnector>,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn host(&self) -> Host {
        Host {
            packages: self.packages.clone(),
            services: self.services.clone(),
            shell: self.shell.clone(),
            writer: self.writer.clone(),
            connector: self.connector.clone(),
        }
    }

    #[must_use]
    pub fn server(&self) -> &FakeServer {
        &self.connector.server
    }
}
