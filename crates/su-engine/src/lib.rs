//! su-engine - Upgrade orchestration for schema-upgrader
//!
//! Owns the version ledger and the executor that applies pending scripts
//! through any [`su_db::Database`] backend.

pub mod error;
pub mod executor;
pub mod ledger;

pub use error::{EngineError, EngineResult};
pub use executor::{
    checksum_drift, pending_units, AppliedUnit, ChecksumDrift, ExecutorOptions, Phase,
    SchemaExecutor, UpgradeSummary,
};
pub use ledger::{LedgerEntry, VersionStore};
