//! Test utilities: recording fakes for the host capabilities and, behind
//! `test-utils-postgres`, an embedded `PostgreSQL` server.

pub mod fakes;
pub mod logs;

#[cfg(feature = "test-utils-postgres")]
pub mod postgres;

pub use fakes::FakeHost;
pub use logs::LogCapture;
