//! su-db - Database abstraction layer for schema-upgrader
//!
//! This crate provides the `Database` trait the migration engine executes
//! against, plus implementations for MySQL (the usual target) and DuckDB
//! (local files and tests).

pub mod duckdb;
pub mod error;
pub mod mysql;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use crate::mysql::{MySqlBackend, MySqlSettings};
pub use traits::{Database, SqlValue};
