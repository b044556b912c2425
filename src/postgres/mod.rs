// PostgreSQL module - everything that talks to the server or builds SQL for it
//
// - config: connection parameters derived from the provisioning spec
// - params: bind parameter conversion
// - session: connector/session capability traits and the tokio-postgres implementation
// - sql: identifier/literal quoting and statement builders

pub mod config;
pub mod params;
pub mod session;
pub mod sql;

pub use config::ConnectParams;
pub use params::Params;
pub use session::{PgConnector, PgSession, QueryConnector, QuerySession};
