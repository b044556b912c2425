//! Convenient imports for common functionality.
//!
//! This module re-exports the types needed to build and drive a reconciler.

pub use crate::error::ProvisionError;
pub use crate::host::{Host, PackageManager, ServiceManager, ShellExecutor};
pub use crate::postgres::{ConnectParams, QueryConnector, QuerySession};
pub use crate::reconciler::{ConnectionState, DatabaseOptions, Reconciled, ResourceReconciler};
pub use crate::render::ArtifactWriter;
pub use crate::spec::{AccessRule, ProvisionOptions, ProvisionSpec, RuleType};
