//! The version ledger: the table recording every applied script.
//!
//! Rows are only ever appended. The current version of a database is the
//! highest recorded id; an empty ledger means nothing has been applied yet.

use crate::error::{db_error, EngineError, EngineResult};
use su_core::config::validate_identifier;
use su_core::MigrationUnit;
use su_db::{Database, DbError, SqlValue};

/// One row of the ledger table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub index: i64,
    pub file: Option<String>,
    pub checksum: Option<String>,
}

/// Reads and appends ledger rows through the run's single connection.
///
/// Nothing is cached; every call goes to the database.
pub struct VersionStore<'a> {
    db: &'a dyn Database,
    table: &'a str,
    auto_create: bool,
}

impl<'a> VersionStore<'a> {
    /// `table` is interpolated into SQL and must be a plain identifier.
    pub fn new(db: &'a dyn Database, table: &'a str, auto_create: bool) -> EngineResult<Self> {
        validate_identifier("version table name", table)?;
        Ok(Self {
            db,
            table,
            auto_create,
        })
    }

    pub fn table(&self) -> &str {
        self.table
    }

    /// Make sure the ledger table exists.
    ///
    /// Returns `true` when the table had to be created.
    pub async fn ensure_ledger(&self) -> EngineResult<bool> {
        if self.exists().await? {
            return Ok(false);
        }
        if !self.auto_create {
            return Err(EngineError::MissingLedger {
                table: self.table.to_string(),
            });
        }
        self.create_ledger().await?;
        Ok(true)
    }

    /// Create the ledger table unconditionally.
    pub async fn create_ledger(&self) -> EngineResult<()> {
        let sql = format!(
            "CREATE TABLE {}(id INTEGER PRIMARY KEY NOT NULL, file TEXT, checksum TEXT)",
            self.table
        );
        self.db
            .execute_batch(&sql)
            .await
            .map_err(|e| db_error(&format!("create the {} table", self.table), e))?;
        log::info!("Created version table {}", self.table);
        Ok(())
    }

    /// Highest recorded version, or `None` for an empty ledger.
    ///
    /// A missing table is an error, not an empty ledger.
    pub async fn current_version(&self) -> EngineResult<Option<i64>> {
        if !self.exists().await? {
            return Err(EngineError::MissingLedger {
                table: self.table.to_string(),
            });
        }
        self.db
            .query_scalar(&format!("SELECT MAX(id) FROM {}", self.table), &[])
            .await
            .map_err(|e| db_error("collect the version numbers", e))
    }

    /// Append the ledger row for a successfully applied unit.
    pub async fn record(&self, unit: &MigrationUnit, digest: &str) -> EngineResult<()> {
        let existing = self
            .db
            .query_scalar(
                &format!("SELECT COUNT(*) FROM {} WHERE id = ?", self.table),
                &[SqlValue::Int(unit.index)],
            )
            .await
            .map_err(|e| db_error("look up an existing version", e))?;
        if existing.unwrap_or(0) > 0 {
            return Err(self.conflict(unit.index));
        }

        let insert = format!(
            "INSERT INTO {}(id, file, checksum) VALUES (?, ?, ?)",
            self.table
        );
        let params = [
            SqlValue::Int(unit.index),
            SqlValue::Text(unit.display_path()),
            SqlValue::from(digest),
        ];
        match self.db.execute(&insert, &params).await {
            Ok(_) => Ok(()),
            // Another writer got there between the check and the insert.
            Err(DbError::ConstraintViolation(_)) => Err(self.conflict(unit.index)),
            Err(e) => Err(db_error("record the applied version", e)),
        }
    }

    /// All ledger rows, ordered by id.
    pub async fn entries(&self) -> EngineResult<Vec<LedgerEntry>> {
        let rows = self
            .db
            .query_rows(
                &format!("SELECT id, file, checksum FROM {} ORDER BY id", self.table),
                &[],
            )
            .await
            .map_err(|e| db_error("read the version table", e))?;

        rows.into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let index = cells.next().and_then(|c| c.as_i64()).ok_or_else(|| {
                    EngineError::Database {
                        operation: "read the version table".to_string(),
                        cause: DbError::Internal("ledger row without an integer id".to_string()),
                    }
                })?;
                let file = cells.next().and_then(into_text);
                let checksum = cells.next().and_then(into_text);
                Ok(LedgerEntry {
                    index,
                    file,
                    checksum,
                })
            })
            .collect()
    }

    async fn exists(&self) -> EngineResult<bool> {
        self.db
            .relation_exists(self.table)
            .await
            .map_err(|e| db_error("look up the version table", e))
    }

    fn conflict(&self, index: i64) -> EngineError {
        EngineError::Conflict {
            index,
            table: self.table.to_string(),
        }
    }
}

fn into_text(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Text(v) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
