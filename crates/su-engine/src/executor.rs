//! Upgrade orchestration.
//!
//! A run walks a fixed sequence of phases against one connection:
//! connect, check (and maybe create) the database, check (and maybe create)
//! the ledger, resolve the current version, then apply every pending script
//! in index order. Each script's statements run one at a time with
//! autocommit; the ledger row is appended only after the last statement of
//! a script succeeds.

use crate::error::{db_error, EngineError, EngineResult};
use crate::ledger::{LedgerEntry, VersionStore};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use su_core::config::validate_identifier;
use su_core::{
    compute_checksum, compute_file_digest, split_statements, CoreError, MigrationUnit, RunConfig,
};
use su_db::Database;

/// Length of a hex SHA-256 digest; shorter ledger checksums predate it.
const DIGEST_HEX_LEN: usize = 64;

/// Stages of an upgrade run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    DatabaseCheck,
    LedgerCheck,
    VersionResolution,
    Applying,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connecting => "connecting",
            Phase::DatabaseCheck => "database check",
            Phase::LedgerCheck => "ledger check",
            Phase::VersionResolution => "version resolution",
            Phase::Applying => "applying",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the executor needs to know about the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub database: String,
    pub ledger_table: String,
    pub create_database: bool,
}

impl ExecutorOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            database: config.database.clone(),
            ledger_table: config.version_table.clone(),
            create_database: config.create_database,
        }
    }
}

/// A script applied during this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedUnit {
    pub index: i64,
    pub file: String,
    pub checksum: String,
    pub statements: usize,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeSummary {
    pub database: String,
    pub version_before: Option<i64>,
    pub version_after: Option<i64>,
    pub highest_file_version: Option<i64>,
    pub created_database: bool,
    pub created_ledger: bool,
    pub applied: Vec<AppliedUnit>,
}

impl UpgradeSummary {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// True when the database was already up to date.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Units that still have to be applied, in catalog order.
///
/// With no current version every unit is pending, index 0 included.
/// Gaps below the current version are never back-filled.
pub fn pending_units(units: &[MigrationUnit], current: Option<i64>) -> Vec<&MigrationUnit> {
    units
        .iter()
        .filter(|unit| current.map_or(true, |version| unit.index > version))
        .collect()
}

/// Drives one upgrade run against a connected backend.
pub struct SchemaExecutor<'a> {
    db: &'a dyn Database,
    options: ExecutorOptions,
}

impl<'a> SchemaExecutor<'a> {
    pub fn new(db: &'a dyn Database, options: ExecutorOptions) -> Self {
        Self { db, options }
    }

    /// Bring the target database up to the highest version in `units`.
    ///
    /// `units` must come from a validated catalog: unique indices in
    /// ascending order.
    pub async fn run(&self, units: &[MigrationUnit]) -> EngineResult<UpgradeSummary> {
        let mut phase = Phase::Connecting;
        let result = self.run_phases(units, &mut phase).await;
        match &result {
            Ok(_) => self.transition(&mut phase, Phase::Done),
            Err(err) => {
                log::debug!("Upgrade stopped during {}: {}", phase, err);
                self.transition(&mut phase, Phase::Failed);
            }
        }
        result
    }

    async fn run_phases(
        &self,
        units: &[MigrationUnit],
        phase: &mut Phase,
    ) -> EngineResult<UpgradeSummary> {
        let database = self.options.database.as_str();
        validate_identifier("database name", database)?;
        log::debug!(
            "Starting {} upgrade of {} with {} script(s)",
            self.db.db_type(),
            database,
            units.len()
        );

        self.db
            .ping()
            .await
            .map_err(|cause| EngineError::Connection { cause })?;

        self.transition(phase, Phase::DatabaseCheck);
        let created_database = self.prepare_database(database).await?;

        self.transition(phase, Phase::LedgerCheck);
        let store = VersionStore::new(
            self.db,
            &self.options.ledger_table,
            self.options.create_database,
        )?;
        let created_ledger = if created_database {
            store.create_ledger().await?;
            true
        } else {
            store.ensure_ledger().await?
        };

        self.transition(phase, Phase::VersionResolution);
        let version_before = store.current_version().await?;
        if version_before.is_none() {
            log::info!(
                "No version listings found in {}.{}. Assuming it is a new database.",
                database,
                store.table()
            );
        }
        self.warn_on_drift(&store, units, version_before).await;

        let highest_file_version = units.iter().map(|unit| unit.index).max();
        let mut summary = UpgradeSummary {
            database: database.to_string(),
            version_before,
            version_after: version_before,
            highest_file_version,
            created_database,
            created_ledger,
            applied: Vec::new(),
        };

        let pending = pending_units(units, version_before);
        if pending.is_empty() {
            log::info!("No update required.");
            log::info!("DB version: {}", display_version(version_before));
            log::info!("Highest file version: {}", display_version(highest_file_version));
            return Ok(summary);
        }

        self.transition(phase, Phase::Applying);
        log::info!("{} script(s) to apply", pending.len());
        for unit in pending {
            summary.applied.push(self.apply_unit(&store, unit).await?);
        }
        summary.version_after = store.current_version().await?;

        Ok(summary)
    }

    /// Select the target database, creating it when allowed.
    ///
    /// Returns `true` when the database was created by this run.
    async fn prepare_database(&self, database: &str) -> EngineResult<bool> {
        let exists = self
            .db
            .database_exists(database)
            .await
            .map_err(|e| db_error("look up the database", e))?;

        let created = if exists {
            false
        } else if self.options.create_database {
            log::info!("DB {} not found, creating.", database);
            self.db
                .create_database(database)
                .await
                .map_err(|e| db_error("create the database", e))?;
            log::info!("DB {} created.", database);
            true
        } else {
            return Err(EngineError::DatabaseMissing {
                database: database.to_string(),
            });
        };

        self.db
            .use_database(database)
            .await
            .map_err(|e| db_error("select the database", e))?;
        Ok(created)
    }

    async fn apply_unit(
        &self,
        store: &VersionStore<'_>,
        unit: &MigrationUnit,
    ) -> EngineResult<AppliedUnit> {
        let path = unit.display_path();
        log::info!("Applying {}", unit);

        let content =
            std::fs::read_to_string(&unit.path).map_err(|source| CoreError::IoWithPath {
                path: path.clone(),
                source,
            })?;

        let statements = split_statements(&content);
        for statement in &statements {
            log::info!("Executing: {}", statement.sql);
            self.db
                .execute_batch(&statement.sql)
                .await
                .map_err(|cause| EngineError::StatementExecution {
                    index: unit.index,
                    path: path.clone(),
                    ordinal: statement.ordinal,
                    statement: statement.sql.clone(),
                    cause,
                })?;
        }

        // Digest of the exact text that was executed
        let checksum = compute_checksum(&content);
        store.record(unit, &checksum).await?;
        log::info!("Recorded version {} ({})", unit.index, path);

        Ok(AppliedUnit {
            index: unit.index,
            file: path,
            checksum,
            statements: statements.len(),
        })
    }

    /// Warn about already-applied scripts whose content changed since.
    ///
    /// Never fails the run and never triggers a re-apply.
    async fn warn_on_drift(
        &self,
        store: &VersionStore<'_>,
        units: &[MigrationUnit],
        current: Option<i64>,
    ) {
        let Some(current) = current else {
            return;
        };

        let entries = match store.entries().await {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Skipping checksum comparison: {}", err);
                return;
            }
        };

        for drift in checksum_drift(units, &entries, current) {
            log::warn!(
                "{} changed after it was applied as version {} (recorded {}, now {})",
                drift.file,
                drift.index,
                drift.recorded,
                drift.actual
            );
        }
    }

    fn transition(&self, phase: &mut Phase, next: Phase) {
        log::debug!("Phase: {} -> {}", phase, next);
        *phase = next;
    }
}

/// An applied script whose file no longer matches its ledger checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumDrift {
    pub index: i64,
    pub file: String,
    pub recorded: String,
    pub actual: String,
}

/// Compare applied units at or below `current` with their ledger rows.
///
/// Rows without a checksum, or with one that is not a SHA-256 hex digest,
/// are skipped. Unreadable files are logged and skipped.
pub fn checksum_drift(
    units: &[MigrationUnit],
    entries: &[LedgerEntry],
    current: i64,
) -> Vec<ChecksumDrift> {
    let recorded: HashMap<i64, &str> = entries
        .iter()
        .filter_map(|entry| Some((entry.index, entry.checksum.as_deref()?)))
        .collect();

    let mut drifted = Vec::new();
    for unit in units.iter().filter(|unit| unit.index <= current) {
        let Some(&expected) = recorded.get(&unit.index) else {
            continue;
        };
        if expected.len() != DIGEST_HEX_LEN {
            log::debug!(
                "Version {} was recorded with a different digest, not comparing",
                unit.index
            );
            continue;
        }
        match compute_file_digest(&unit.path) {
            Ok(actual) if actual != expected => drifted.push(ChecksumDrift {
                index: unit.index,
                file: unit.display_path(),
                recorded: expected.to_string(),
                actual,
            }),
            Ok(_) => {}
            Err(err) => log::warn!("Could not checksum {}: {}", unit.display_path(), err),
        }
    }
    drifted
}

fn display_version(version: Option<i64>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
