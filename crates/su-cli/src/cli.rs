//! CLI argument definitions using clap derive API

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use su_core::config::{
    DEFAULT_DUCKDB_PATH, DEFAULT_SCRIPTS_PATH, DEFAULT_SQL_DB, DEFAULT_SQL_HOST,
    DEFAULT_SQL_PASSWORD, DEFAULT_SQL_PORT, DEFAULT_SQL_USERNAME, DEFAULT_VERSION_TABLE,
};
use su_core::{Backend, CoreResult, RunConfig};

const LONG_ABOUT: &str = "\
Upgrades a database schema by applying numbered SQL scripts in order.

Every script name must start with its version number. Numbers may have gaps
and may carry leading zeros:

    1_something.sql, 002somethingelse.sql, 54_someOtherthing.sql

Applied versions are recorded in a version table together with the script
path and its SHA-256 checksum. The table is called `version` unless
--sqlversion-table says otherwise. To retrofit an existing database, create
it by hand:

    CREATE TABLE version(id INTEGER PRIMARY KEY NOT NULL, file TEXT, checksum TEXT);

With --create-db the database and the version table are created when missing.";

/// schema-upgrader - apply numbered SQL scripts to a database, in order, once
#[derive(Parser, Debug)]
#[command(name = "schema-upgrader")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// SQL server host
    #[arg(long, default_value = DEFAULT_SQL_HOST)]
    pub sqlhost: String,

    /// SQL server port
    #[arg(long, default_value_t = DEFAULT_SQL_PORT)]
    pub sqlport: u16,

    /// SQL user name
    #[arg(long, default_value = DEFAULT_SQL_USERNAME)]
    pub sqlusername: String,

    /// SQL password
    #[arg(long, default_value = DEFAULT_SQL_PASSWORD, hide_default_value = true)]
    pub sqlpassword: String,

    /// Database to upgrade
    #[arg(long, default_value = DEFAULT_SQL_DB)]
    pub sqldb: String,

    /// Table that records applied script versions
    #[arg(long = "sqlversion-table", default_value = DEFAULT_VERSION_TABLE)]
    pub sqlversion_table: String,

    /// Directory containing the numbered .sql scripts
    #[arg(long, default_value = DEFAULT_SCRIPTS_PATH)]
    pub scripts_path: PathBuf,

    /// Create the database and version table if they are missing
    #[arg(long)]
    pub create_db: bool,

    /// Read settings from SQL_* and related environment variables, overriding flags
    #[arg(long)]
    pub use_environment_variables: bool,

    /// Database backend
    #[arg(long, value_enum, default_value = "mysql")]
    pub backend: BackendArg,

    /// DuckDB database file (duckdb backend only)
    #[arg(long, default_value = DEFAULT_DUCKDB_PATH)]
    pub duckdb_path: String,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Supported backends
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// MySQL or MariaDB server
    Mysql,
    /// DuckDB file or in-memory database
    Duckdb,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mysql => Backend::MySql,
            BackendArg::Duckdb => Backend::DuckDb,
        }
    }
}

/// Summary output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON summary
    Json,
}

impl Cli {
    /// Flag values only, without the environment overlay or validation.
    pub fn flag_config(&self) -> RunConfig {
        RunConfig {
            sql_host: self.sqlhost.clone(),
            sql_port: self.sqlport,
            sql_username: self.sqlusername.clone(),
            sql_password: self.sqlpassword.clone(),
            database: self.sqldb.clone(),
            version_table: self.sqlversion_table.clone(),
            scripts_path: self.scripts_path.clone(),
            create_database: self.create_db,
            backend: self.backend.into(),
            duckdb_path: self.duckdb_path.clone(),
        }
    }

    /// The validated configuration for this run.
    pub fn to_run_config(&self) -> CoreResult<RunConfig> {
        let config = if self.use_environment_variables {
            self.flag_config().with_process_environment()?
        } else {
            self.flag_config()
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
