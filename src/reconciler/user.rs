use tracing::{error, info};

use super::{Reconciled, ResourceReconciler};
use crate::error::ProvisionError;
use crate::postgres::sql;

impl ResourceReconciler {
    /// Create role `name` with `password` unless it already exists.
    ///
    /// An existing role is left exactly as it is: its password is not
    /// updated. The connection is opened on demand and stays open afterward.
    ///
    /// # Errors
    /// Returns `ProvisionError::ConnectionError` if the server is unreachable,
    /// or `ProvisionError::QueryError` if the lookup or `CREATE USER` fails.
    pub async fn ensure_user(
        &mut self,
        name: &str,
        password: &str,
    ) -> Result<Reconciled, ProvisionError> {
        let result = self.reconcile_user(name, password).await;
        match &result {
            Ok(Reconciled::Created) => info!(user = name, "PostgreSQL user created"),
            Ok(Reconciled::AlreadyPresent) => info!(user = name, "PostgreSQL user already exists"),
            Err(e) => error!(
                operation = "ensure_user",
                resource = name,
                error = %e,
                "failed to ensure user"
            ),
        }
        result
    }

    async fn reconcile_user(
        &mut self,
        name: &str,
        password: &str,
    ) -> Result<Reconciled, ProvisionError> {
        let session = self.session().await?;

        if session.query_count(sql::ROLE_EXISTS, &[name]).await? > 0 {
            return Ok(Reconciled::AlreadyPresent);
        }

        session.execute(&sql::create_user(name, password)).await?;
        Ok(Reconciled::Created)
    }
}
