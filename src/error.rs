use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Package install error: {0}")]
    InstallError(String),

    #[error("Command error: {0}")]
    CommandError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl From<askama::Error> for ProvisionError {
    fn from(err: askama::Error) -> Self {
        ProvisionError::TemplateError(format!("render failed: {err}"))
    }
}
