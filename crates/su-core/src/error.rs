//! Error types for su-core

use std::fmt;
use thiserror::Error;

/// A pair of scripts that resolve to the same migration index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCollision {
    pub index: i64,
    pub path_a: String,
    pub path_b: String,
}

impl fmt::Display for IndexCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} and {}", self.index, self.path_a, self.path_b)
    }
}

/// Core error type for schema-upgrader.
///
/// Everything in here is a configuration problem detected before the
/// database is contacted, apart from the I/O variants.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Scripts directory does not exist
    #[error("[C001] Scripts path not found: {path}")]
    NotFound { path: String },

    /// C002: Scripts path exists but is not a directory
    #[error("[C002] Scripts path is not a directory: {path}")]
    NotADirectory { path: String },

    /// C003: No `.sql` files in the scripts directory
    #[error("[C003] No .sql files found to process in {path}")]
    EmptyCatalog { path: String },

    /// C004: One or more script names have no leading index
    #[error("[C004] Script names must start with a numeric index: {}", .files.join(", "))]
    MalformedName { files: Vec<String> },

    /// C005: Two or more scripts share an index
    #[error(
        "[C005] Duplicate numbered files, can't determine a safe order: {}",
        format_collisions(.collisions)
    )]
    DuplicateIndex { collisions: Vec<IndexCollision> },

    /// C006: Invalid configuration value
    #[error("[C006] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C007: IO error with file path context
    #[error("[C007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

fn format_collisions(collisions: &[IndexCollision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
