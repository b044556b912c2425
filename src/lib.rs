//! Idempotent PostgreSQL provisioning.
//!
//! A [`ResourceReconciler`] installs the server package, renders
//! `postgresql.conf` and `pg_hba.conf`, and creates roles and databases only
//! when they are missing. Everything it touches on the host goes through the
//! capability traits in [`host`], [`render`] and [`postgres`], so each step
//! can be swapped or faked.
//!
//! ```rust,no_run
//! use pg_provision::prelude::*;
//!
//! # async fn run() -> Result<(), ProvisionError> {
//! let options = ProvisionOptions {
//!     port: Some(5433),
//!     ..ProvisionOptions::default()
//! };
//! let mut reconciler = ResourceReconciler::new(options, Host::system());
//! reconciler.install().await?;
//! reconciler.configure().await?;
//! let outcome = reconciler.ensure_user("app", "secret").await?;
//! println!("user app: {outcome}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod host;
pub mod postgres;
pub mod prelude;
pub mod reconciler;
pub mod render;
pub mod spec;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::ProvisionError;
pub use reconciler::{ConnectionState, DatabaseOptions, Reconciled, ResourceReconciler};
pub use spec::{AccessRule, ProvisionOptions, ProvisionSpec, RuleType};
