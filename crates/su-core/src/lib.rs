//! su-core - Core library for schema-upgrader
//!
//! This crate provides migration script discovery and ordering, file
//! checksums, statement splitting and the run configuration shared by the
//! engine and the CLI.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod statement;

pub use catalog::{discover, load_catalog, parse_index, validate_unique_order, MigrationUnit};
pub use checksum::{compute_checksum, compute_file_digest};
pub use config::{Backend, RunConfig};
pub use error::{CoreError, CoreResult, IndexCollision};
pub use statement::{split_statements, Statement};
