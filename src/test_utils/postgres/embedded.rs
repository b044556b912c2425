use postgresql_embedded::PostgreSQL;

use crate::spec::ProvisionOptions;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Options pointing the reconciler at this instance's superuser.
    pub options: ProvisionOptions,
}

/// Set up and start an embedded `PostgreSQL` instance.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started.
pub async fn start_postgres_embedded() -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    let mut postgresql = PostgreSQL::default();

    // Setup PostgreSQL binaries (bundled, so no download conflicts)
    postgresql.setup().await?;
    postgresql.start().await?;

    let settings = postgresql.settings();
    let port = settings.port;
    let options = ProvisionOptions {
        host: Some(settings.host.clone()),
        port: Some(port),
        default_user: Some(settings.username.clone()),
        default_password: Some(settings.password.clone()),
        default_database: Some("postgres".to_string()),
        ..ProvisionOptions::default()
    };

    println!("PostgreSQL started on port {port}");

    Ok(EmbeddedPostgres {
        postgresql,
        port,
        options,
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub async fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    let _ = postgresql.stop().await;
}
