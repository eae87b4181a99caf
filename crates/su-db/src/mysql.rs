//! MySQL / MariaDB database backend implementation
//!
//! Holds exactly one connection opened against the server root (no default
//! schema), so the target database can be probed and created before it is
//! selected with `USE`.

use crate::error::{DbError, DbResult};
use crate::traits::{Database, SqlValue};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Connection, Executor, Row};
use tokio::sync::Mutex;

/// Server address and credentials
#[derive(Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl MySqlSettings {
    /// Connect options for the server root, without a default database
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .disable_statement_logging()
    }
}

/// MySQL database backend
pub struct MySqlBackend {
    conn: Mutex<MySqlConnection>,
}

impl MySqlBackend {
    /// Open the single connection used for the whole run.
    ///
    /// Any failure here, including rejected credentials, is a connection
    /// error.
    pub async fn connect(settings: &MySqlSettings) -> DbResult<Self> {
        log::debug!(
            "Connecting to MySQL at {}:{} as {}",
            settings.host,
            settings.port,
            settings.username
        );
        let conn = MySqlConnection::connect_with(&settings.connect_options())
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

fn decode_row(row: &MySqlRow) -> DbResult<Vec<SqlValue>> {
    let mut cells = Vec::with_capacity(row.len());
    for idx in 0..row.len() {
        let cell = if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            v.map_or(SqlValue::Null, SqlValue::Int)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            v.map_or(SqlValue::Null, SqlValue::Text)
        } else {
            return Err(DbError::Internal(format!(
                "unsupported column type at index {idx}"
            )));
        };
        cells.push(cell);
    }
    Ok(cells)
}

#[async_trait]
impl Database for MySqlBackend {
    async fn ping(&self) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        conn.ping()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    async fn database_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .query_scalar(
                "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
                &[SqlValue::from(name)],
            )
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    async fn create_database(&self, name: &str) -> DbResult<()> {
        self.execute_batch(&format!("CREATE DATABASE {name}")).await
    }

    async fn use_database(&self, name: &str) -> DbResult<()> {
        self.execute_batch(&format!("USE {name}")).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .query_scalar(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?",
                &[SqlValue::from(name)],
            )
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        // A plain &str goes through the text protocol, which accepts
        // statements (USE, most DDL) that cannot be prepared.
        let mut conn = self.conn.lock().await;
        (&mut *conn).execute(sql).await?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let mut conn = self.conn.lock().await;
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>> {
        let mut conn = self.conn.lock().await;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }
}

#[cfg(test)]
#[path = "mysql_test.rs"]
mod tests;
