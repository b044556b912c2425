use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use super::config::ConnectParams;
use super::params::Params;
use crate::error::ProvisionError;

/// Opens query sessions against the database server.
#[async_trait]
pub trait QueryConnector: Send + Sync {
    /// Establish a new session.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConnectionError` on transport or authentication failure.
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn QuerySession>, ProvisionError>;
}

/// One open connection; treated as an opaque query executor.
#[async_trait]
pub trait QuerySession: Send + Sync {
    /// Run a row-returning statement and report how many rows came back.
    ///
    /// # Errors
    /// Returns `ProvisionError::QueryError` if the server rejects the statement.
    async fn query_count(&mut self, sql: &str, params: &[&str]) -> Result<u64, ProvisionError>;

    /// Run a statement that returns no rows (DDL).
    ///
    /// # Errors
    /// Returns `ProvisionError::QueryError` if the server rejects the statement.
    async fn execute(&mut self, sql: &str) -> Result<(), ProvisionError>;

    /// Release the connection.
    async fn close(self: Box<Self>);
}

/// `tokio_postgres` connector without TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl QueryConnector for PgConnector {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn QuerySession>, ProvisionError> {
        let config = params.to_pg_config()?;
        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            ProvisionError::ConnectionError(format!(
                "cannot connect to {}:{} as {}: {}",
                params.host,
                params.port,
                params.user,
                describe(&e)
            ))
        })?;

        // Transport failures after the handshake surface here, out of band.
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection error");
            }
        });

        debug!(host = %params.host, port = params.port, "postgres session opened");
        Ok(Box::new(PgSession { client, connection }))
    }
}

pub struct PgSession {
    client: Client,
    connection: JoinHandle<()>,
}

#[async_trait]
impl QuerySession for PgSession {
    async fn query_count(&mut self, sql: &str, params: &[&str]) -> Result<u64, ProvisionError> {
        let converted = Params::convert(params);
        let rows = self
            .client
            .query(sql, converted.as_refs())
            .await
            .map_err(|e| ProvisionError::QueryError(describe(&e)))?;
        Ok(rows.len() as u64)
    }

    async fn execute(&mut self, sql: &str) -> Result<(), ProvisionError> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| ProvisionError::QueryError(describe(&e)))
    }

    async fn close(self: Box<Self>) {
        let PgSession { client, connection } = *self;
        drop(client);
        if let Err(e) = connection.await {
            error!(error = %e, "postgres connection task did not shut down cleanly");
        }
    }
}

/// Prefer the server's message over the driver's terse summary.
fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => err.to_string(),
    }
}
