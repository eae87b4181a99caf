//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use std::fmt;

/// A bound parameter or a decoded result cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// SQL executor capability used by the migration engine.
///
/// Every method runs against the backend's single connection, in call order.
/// Parameter placeholders are `?`. Implementations must be Send + Sync for
/// async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Round-trip liveness probe
    async fn ping(&self) -> DbResult<()>;

    /// Check whether a database (schema / catalog) with this name exists
    async fn database_exists(&self, name: &str) -> DbResult<bool>;

    /// Create a database; the name must already be a validated identifier
    async fn create_database(&self, name: &str) -> DbResult<()>;

    /// Make `name` the current database for subsequent statements
    async fn use_database(&self, name: &str) -> DbResult<()>;

    /// Check if a table or view exists in the current database
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Execute one raw statement without parameters
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a parameterized statement, returns affected rows
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Run a query and decode every row
    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>>;

    /// First column of the first row as an integer.
    ///
    /// Returns `None` when the query yields no rows or a NULL.
    async fn query_scalar(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<i64>> {
        let rows = self.query_rows(sql, params).await?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .and_then(SqlValue::as_i64))
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
