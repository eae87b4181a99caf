//! DuckDB database backend implementation
//!
//! DuckDB has no server-side databases, so named databases map to attached
//! catalogs. A file-backed backend keeps each database in a sibling file
//! `<name>.duckdb` next to the main file; an in-memory backend attaches
//! in-memory catalogs that live as long as the connection.

use crate::error::{DbError, DbResult};
use crate::traits::{Database, SqlValue};
use async_trait::async_trait;
use duckdb::types::{ToSqlOutput, Value};
use duckdb::{params, params_from_iter, Connection, ToSql};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Where the main DuckDB catalog lives
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    InMemory,
    File(PathBuf),
}

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    location: Location,
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Int(v) => ToSqlOutput::Owned(Value::BigInt(*v)),
            SqlValue::Text(v) => ToSqlOutput::Owned(Value::Text(v.clone())),
        })
    }
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: Location::InMemory,
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: Location::File(path.to_path_buf()),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// File that holds database `name` for a file-backed backend
    fn database_file(&self, name: &str) -> Option<PathBuf> {
        match &self.location {
            Location::InMemory => None,
            Location::File(main) => Some(main.with_file_name(format!("{name}.duckdb"))),
        }
    }

    fn is_attached(conn: &Connection, name: &str) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM duckdb_databases() WHERE database_name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn attach(&self, conn: &Connection, name: &str) -> DbResult<()> {
        let target = match self.database_file(name) {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        };
        let sql = format!("ATTACH '{}' AS {}", target.replace('\'', "''"), name);
        log::debug!("Attaching DuckDB database {name} from {target}");
        conn.execute_batch(&sql)?;
        Ok(())
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(DbError::from)
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    /// Query rows synchronously
    fn query_rows_sync(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::new();
            for idx in 0.. {
                match row.get::<_, Value>(idx) {
                    Ok(value) => cells.push(convert_value(value)?),
                    Err(duckdb::Error::InvalidColumnIndex(_)) => break,
                    Err(e) => return Err(e.into()),
                }
            }
            out.push(cells);
        }
        Ok(out)
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = current_database() \
               AND table_schema = current_schema() \
               AND table_name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn convert_value(value: Value) -> DbResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(v) => SqlValue::Int(i64::from(v)),
        Value::TinyInt(v) => SqlValue::Int(i64::from(v)),
        Value::SmallInt(v) => SqlValue::Int(i64::from(v)),
        Value::Int(v) => SqlValue::Int(i64::from(v)),
        Value::BigInt(v) => SqlValue::Int(v),
        Value::UTinyInt(v) => SqlValue::Int(i64::from(v)),
        Value::USmallInt(v) => SqlValue::Int(i64::from(v)),
        Value::UInt(v) => SqlValue::Int(i64::from(v)),
        Value::HugeInt(v) => SqlValue::Int(
            i64::try_from(v).map_err(|_| DbError::Internal(format!("HUGEINT {v} out of range")))?,
        ),
        Value::UBigInt(v) => SqlValue::Int(
            i64::try_from(v).map_err(|_| DbError::Internal(format!("UBIGINT {v} out of range")))?,
        ),
        Value::Text(v) => SqlValue::Text(v),
        other => {
            return Err(DbError::Internal(format!(
                "unsupported column value: {other:?}"
            )))
        }
    })
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn ping(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    async fn database_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        if Self::is_attached(&conn, name)? {
            return Ok(true);
        }
        Ok(self.database_file(name).is_some_and(|path| path.exists()))
    }

    async fn create_database(&self, name: &str) -> DbResult<()> {
        let conn = self.lock()?;
        self.attach(&conn, name)
    }

    async fn use_database(&self, name: &str) -> DbResult<()> {
        let conn = self.lock()?;
        if !Self::is_attached(&conn, name)? {
            self.attach(&conn, name)?;
        }
        conn.execute_batch(&format!("USE {name}"))?;
        Ok(())
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.execute_sync(sql, params)
    }

    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>> {
        self.query_rows_sync(sql, params)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
