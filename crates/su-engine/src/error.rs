//! Error types for su-engine

use su_core::CoreError;
use su_db::DbError;
use thiserror::Error;

/// Errors that end an upgrade run.
///
/// None of these are retried; the run stops at the first one.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Catalog, configuration or script I/O problem
    #[error(transparent)]
    Core(#[from] CoreError),

    /// U001: Server unreachable, credentials rejected or connection lost
    #[error("[U001] Failed to validate the connection: {cause}")]
    Connection { cause: DbError },

    /// U002: Target database is absent and creation was not requested
    #[error("[U002] Database '{database}' not found. Use --create-db to create it")]
    DatabaseMissing { database: String },

    /// U003: Ledger table is absent and creation was not requested
    #[error("[U003] Version table '{table}' not found. Use --create-db to create it")]
    MissingLedger { table: String },

    /// U004: The configured user lacks a privilege
    #[error("[U004] Permission denied while trying to {operation}: {cause}")]
    Permission { operation: String, cause: DbError },

    /// U005: A migration statement failed
    #[error(
        "[U005] Statement {ordinal} of {path} (version {index}) failed: {cause}\n  statement: {statement}"
    )]
    StatementExecution {
        index: i64,
        path: String,
        ordinal: usize,
        statement: String,
        cause: DbError,
    },

    /// U006: The ledger already holds this version
    #[error("[U006] Version {index} is already recorded in '{table}'")]
    Conflict { index: i64, table: String },

    /// U007: Any other database failure
    #[error("[U007] Database error while trying to {operation}: {cause}")]
    Database { operation: String, cause: DbError },
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Wrap a driver error raised while performing `operation`.
pub(crate) fn db_error(operation: &str, cause: DbError) -> EngineError {
    match cause {
        DbError::PermissionDenied(_) => EngineError::Permission {
            operation: operation.to_string(),
            cause,
        },
        DbError::ConnectionError(_) => EngineError::Connection { cause },
        _ => EngineError::Database {
            operation: operation.to_string(),
            cause,
        },
    }
}
