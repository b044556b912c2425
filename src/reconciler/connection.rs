use tracing::{debug, error};

use super::ResourceReconciler;
use crate::error::ProvisionError;
use crate::postgres::{ConnectParams, QuerySession};

/// Observable state of the reconciler's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Closed,
}

pub(super) enum Connection {
    Unconnected,
    Connected(Box<dyn QuerySession>),
    Closed,
}

impl Connection {
    pub(super) fn state(&self) -> ConnectionState {
        match self {
            Connection::Unconnected => ConnectionState::Unconnected,
            Connection::Connected(_) => ConnectionState::Connected,
            Connection::Closed => ConnectionState::Closed,
        }
    }
}

impl ResourceReconciler {
    /// Connect with the spec's default credentials unless already connected.
    ///
    /// A failed attempt leaves the state untouched so a later call can retry.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConnectionError` (or `ConfigError` for
    /// incomplete credentials) when the connection cannot be established.
    pub async fn open_connection(&mut self) -> Result<(), ProvisionError> {
        self.connect().await.inspect_err(|e| {
            error!(
                operation = "open_connection",
                resource = %self.spec.default_database,
                error = %e,
                "failed to connect to PostgreSQL"
            );
        })
    }

    /// Connect unless already connected. Failures are left for the caller to log.
    async fn connect(&mut self) -> Result<(), ProvisionError> {
        if let Connection::Connected(_) = self.connection {
            return Ok(());
        }

        let params = ConnectParams::from_spec(&self.spec);
        match self.host.connector.connect(&params).await {
            Ok(session) => {
                debug!(
                    host = %params.host,
                    port = params.port,
                    database = %params.dbname,
                    "connected"
                );
                self.connection = Connection::Connected(session);
                Ok(())
            }
            Err(e) => {
                debug!(database = %params.dbname, error = %e, "connect attempt failed");
                Err(e)
            }
        }
    }

    /// Release the session if one is open. Calling it again is a no-op.
    pub async fn close_connection(&mut self) {
        if !matches!(self.connection, Connection::Connected(_)) {
            return;
        }
        if let Connection::Connected(session) =
            std::mem::replace(&mut self.connection, Connection::Closed)
        {
            session.close().await;
            debug!("connection closed");
        }
    }

    /// The open session, connecting first if needed. Connection failures are
    /// logged by the ensure operation that asked for the session.
    pub(super) async fn session(&mut self) -> Result<&mut dyn QuerySession, ProvisionError> {
        self.connect().await?;
        match &mut self.connection {
            Connection::Connected(session) => Ok(session.as_mut()),
            Connection::Unconnected | Connection::Closed => Err(
                ProvisionError::ConnectionError("connection is not open".to_string()),
            ),
        }
    }
}
