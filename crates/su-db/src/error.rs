//! Error types for su-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Insufficient privileges (D003)
    #[error("[D003] Permission denied: {0}")]
    PermissionDenied(String),

    /// Primary key or unique constraint violated (D004)
    #[error("[D004] Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D006)
    #[error("[D006] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for engine
        // errors, so classification goes by the message prefix.
        let msg = err.to_string();
        if msg.contains("Constraint Error") || msg.contains("Duplicate key") {
            DbError::ConstraintViolation(msg)
        } else if msg.contains("Permission Error") {
            DbError::PermissionDenied(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

/// MySQL server error numbers that mean the user lacks a privilege.
const MYSQL_ACCESS_DENIED: &[u16] = &[
    1044, // ER_DBACCESS_DENIED_ERROR
    1045, // ER_ACCESS_DENIED_ERROR
    1142, // ER_TABLEACCESS_DENIED_ERROR
    1143, // ER_COLUMNACCESS_DENIED_ERROR
    1227, // ER_SPECIFIC_ACCESS_DENIED_ERROR
];

/// ER_DUP_ENTRY
const MYSQL_DUPLICATE_ENTRY: u16 = 1062;

/// Classify a MySQL server error by its error number.
pub(crate) fn classify_mysql_error(number: u16, message: String) -> DbError {
    if MYSQL_ACCESS_DENIED.contains(&number) {
        DbError::PermissionDenied(message)
    } else if number == MYSQL_DUPLICATE_ENTRY {
        DbError::ConstraintViolation(message)
    } else {
        DbError::ExecutionError(message)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let msg = err.to_string();
        match &err {
            sqlx::Error::Database(db_err) => {
                match db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
                    Some(mysql_err) => classify_mysql_error(mysql_err.number(), msg),
                    None => DbError::ExecutionError(msg),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::ConnectionError(msg),
            _ => DbError::ExecutionError(msg),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
