// Configuration rendering
//
// - templates: askama bindings for postgresql.conf and pg_hba.conf
// - writer: where rendered text ends up

mod templates;
pub mod writer;

use std::path::PathBuf;

use askama::Template;

use crate::error::ProvisionError;
use crate::spec::ProvisionSpec;
use templates::{AccessConfigTemplate, ServerConfigTemplate};

pub use writer::{ArtifactWriter, FsArtifactWriter};

/// A rendered file and the path it belongs at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Render `postgresql.conf` for `spec`.
///
/// # Errors
/// Returns `ProvisionError::TemplateError` if the template fails to render.
pub fn render_server_config(spec: &ProvisionSpec) -> Result<RenderedArtifact, ProvisionError> {
    let contents = ServerConfigTemplate::new(spec).render()?;
    Ok(RenderedArtifact {
        path: spec.server_config_path(),
        contents: with_trailing_newline(contents),
    })
}

/// Render `pg_hba.conf` for `spec`, one record per line in list order.
///
/// # Errors
/// Returns `ProvisionError::TemplateError` if the template fails to render.
pub fn render_access_config(spec: &ProvisionSpec) -> Result<RenderedArtifact, ProvisionError> {
    let contents = AccessConfigTemplate::new(spec).render()?;
    Ok(RenderedArtifact {
        path: spec.access_config_path(),
        contents: with_trailing_newline(contents),
    })
}

fn with_trailing_newline(mut contents: String) -> String {
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents
}
