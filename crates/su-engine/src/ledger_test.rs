use super::*;
use async_trait::async_trait;
use su_core::compute_checksum;
use su_db::{DbResult, DuckDbBackend};

/// Backend whose existence checks always see an empty table, as if another
/// writer inserted the same row right after the check.
struct StaleCountDb {
    inner: DuckDbBackend,
}

#[async_trait]
impl Database for StaleCountDb {
    async fn ping(&self) -> DbResult<()> {
        self.inner.ping().await
    }

    async fn database_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.database_exists(name).await
    }

    async fn create_database(&self, name: &str) -> DbResult<()> {
        self.inner.create_database(name).await
    }

    async fn use_database(&self, name: &str) -> DbResult<()> {
        self.inner.use_database(name).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.inner.execute_batch(sql).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.inner.execute(sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>> {
        if sql.contains("COUNT(*)") {
            return Ok(vec![vec![SqlValue::Int(0)]]);
        }
        self.inner.query_rows(sql, params).await
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

fn unit(index: i64) -> MigrationUnit {
    MigrationUnit::new(index, format!("/scripts/{index:02}_step.sql"))
}

#[tokio::test]
async fn test_ensure_ledger_creates_when_allowed() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();

    assert!(store.ensure_ledger().await.unwrap());
    assert!(db.relation_exists("version").await.unwrap());
    // Already there the second time
    assert!(!store.ensure_ledger().await.unwrap());
}

#[tokio::test]
async fn test_ensure_ledger_missing_without_auto_create() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", false).unwrap();

    let err = store.ensure_ledger().await.unwrap_err();
    assert!(matches!(err, EngineError::MissingLedger { ref table } if table == "version"));
    assert!(!db.relation_exists("version").await.unwrap());
}

#[tokio::test]
async fn test_ledger_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "schema_log", true).unwrap();
    store.create_ledger().await.unwrap();

    let rows = db
        .query_rows(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = 'schema_log' ORDER BY ordinal_position",
            &[],
        )
        .await
        .unwrap();
    let columns: Vec<&str> = rows.iter().filter_map(|row| row[0].as_str()).collect();
    assert_eq!(columns, vec!["id", "file", "checksum"]);
}

#[tokio::test]
async fn test_current_version_empty_ledger() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();
    store.ensure_ledger().await.unwrap();

    assert_eq!(store.current_version().await.unwrap(), None);
}

#[tokio::test]
async fn test_current_version_is_highest_recorded() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();
    store.ensure_ledger().await.unwrap();

    for index in [3, 8, 5] {
        store
            .record(&unit(index), &compute_checksum("x"))
            .await
            .unwrap();
    }

    assert_eq!(store.current_version().await.unwrap(), Some(8));
}

#[tokio::test]
async fn test_current_version_without_table_is_an_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();

    let err = store.current_version().await.unwrap_err();
    assert!(matches!(err, EngineError::MissingLedger { .. }));
}

#[tokio::test]
async fn test_record_duplicate_is_conflict() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();
    store.ensure_ledger().await.unwrap();

    store.record(&unit(4), "first").await.unwrap();
    let err = store.record(&unit(4), "second").await.unwrap_err();

    assert!(matches!(err, EngineError::Conflict { index: 4, .. }));
    let entries = store.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].checksum.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_record_duplicate_insert_is_conflict() {
    let db = StaleCountDb {
        inner: DuckDbBackend::in_memory().unwrap(),
    };
    let store = VersionStore::new(&db, "version", true).unwrap();
    store.ensure_ledger().await.unwrap();

    store.record(&unit(4), "first").await.unwrap();
    // The pre-check passes, so the primary key has to reject the insert
    let err = store.record(&unit(4), "second").await.unwrap_err();

    assert!(matches!(err, EngineError::Conflict { index: 4, ref table } if table == "version"));
    let entries = store.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].checksum.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_entries_ordered_by_id() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(&db, "version", true).unwrap();
    store.ensure_ledger().await.unwrap();

    let digest = compute_checksum("SELECT 1;\n");
    store.record(&unit(2), &digest).await.unwrap();
    store.record(&unit(1), &digest).await.unwrap();

    let entries = store.entries().await.unwrap();
    assert_eq!(
        entries,
        vec![
            LedgerEntry {
                index: 1,
                file: Some("/scripts/01_step.sql".to_string()),
                checksum: Some(digest.clone()),
            },
            LedgerEntry {
                index: 2,
                file: Some("/scripts/02_step.sql".to_string()),
                checksum: Some(digest),
            },
        ]
    );
}

#[test]
fn test_rejects_unsafe_table_name() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = VersionStore::new(&db, "version; DROP TABLE users", true);
    assert!(matches!(
        result,
        Err(EngineError::Core(su_core::CoreError::ConfigInvalid { .. }))
    ));
}
