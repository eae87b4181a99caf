//! Run configuration for schema-upgrader.
//!
//! [`RunConfig`] is built once at startup (flags first, then the optional
//! environment overlay) and handed to every component by reference.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_SQL_HOST: &str = "SQL_HOST";
pub const ENV_SQL_PORT: &str = "SQL_PORT";
pub const ENV_SQL_USERNAME: &str = "SQL_USERNAME";
pub const ENV_SQL_PASSWORD: &str = "SQL_PASSWORD";
pub const ENV_SQL_DB: &str = "SQL_DB";
pub const ENV_SQL_VERSION_TABLE: &str = "SQL_VERSION_TABLE";
pub const ENV_SCRIPTS_PATH: &str = "SCRIPTS_PATH";
pub const ENV_CREATE_DB: &str = "CREATE_DB";
pub const ENV_SQL_BACKEND: &str = "SQL_BACKEND";
pub const ENV_DUCKDB_PATH: &str = "DUCKDB_PATH";

pub const DEFAULT_SQL_HOST: &str = "localhost";
pub const DEFAULT_SQL_PORT: u16 = 3306;
pub const DEFAULT_SQL_USERNAME: &str = "root";
pub const DEFAULT_SQL_PASSWORD: &str = "root";
pub const DEFAULT_SQL_DB: &str = "test";
pub const DEFAULT_VERSION_TABLE: &str = "version";
pub const DEFAULT_SCRIPTS_PATH: &str = "/data";
pub const DEFAULT_DUCKDB_PATH: &str = ":memory:";

/// Database backend the scripts are applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// MySQL / MariaDB server reached over the network
    #[default]
    MySql,
    /// Local DuckDB database file (or in-memory)
    DuckDb,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::DuckDb => "duckdb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Backend::MySql),
            "duckdb" => Ok(Backend::DuckDb),
            other => Err(CoreError::ConfigInvalid {
                message: format!("unknown backend '{other}', expected 'mysql' or 'duckdb'"),
            }),
        }
    }
}

/// Immutable configuration for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub sql_host: String,
    pub sql_port: u16,
    pub sql_username: String,
    pub sql_password: String,

    /// Database the scripts are applied to
    pub database: String,

    /// Name of the ledger table inside `database`
    pub version_table: String,

    /// Directory holding the numbered `.sql` scripts
    pub scripts_path: PathBuf,

    /// Create `database` (and the ledger table) when missing
    pub create_database: bool,

    pub backend: Backend,

    /// DuckDB database file, or `:memory:`; only used by the DuckDB backend
    pub duckdb_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sql_host: DEFAULT_SQL_HOST.to_string(),
            sql_port: DEFAULT_SQL_PORT,
            sql_username: DEFAULT_SQL_USERNAME.to_string(),
            sql_password: DEFAULT_SQL_PASSWORD.to_string(),
            database: DEFAULT_SQL_DB.to_string(),
            version_table: DEFAULT_VERSION_TABLE.to_string(),
            scripts_path: PathBuf::from(DEFAULT_SCRIPTS_PATH),
            create_database: false,
            backend: Backend::default(),
            duckdb_path: DEFAULT_DUCKDB_PATH.to_string(),
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("sql_host", &self.sql_host)
            .field("sql_port", &self.sql_port)
            .field("sql_username", &self.sql_username)
            .field("sql_password", &"<redacted>")
            .field("database", &self.database)
            .field("version_table", &self.version_table)
            .field("scripts_path", &self.scripts_path)
            .field("create_database", &self.create_database)
            .field("backend", &self.backend)
            .field("duckdb_path", &self.duckdb_path)
            .finish()
    }
}

impl RunConfig {
    /// Overlay values from environment-style variables.
    ///
    /// Only variables that `lookup` returns are applied; everything else keeps
    /// its current value.
    pub fn with_environment<F>(mut self, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SQL_HOST) {
            self.sql_host = value;
        }
        if let Some(value) = lookup(ENV_SQL_PORT) {
            self.sql_port = value.trim().parse().map_err(|_| CoreError::ConfigInvalid {
                message: format!("{ENV_SQL_PORT} is not a valid port number: '{value}'"),
            })?;
        }
        if let Some(value) = lookup(ENV_SQL_USERNAME) {
            self.sql_username = value;
        }
        if let Some(value) = lookup(ENV_SQL_PASSWORD) {
            self.sql_password = value;
        }
        if let Some(value) = lookup(ENV_SQL_DB) {
            self.database = value;
        }
        if let Some(value) = lookup(ENV_SQL_VERSION_TABLE) {
            self.version_table = value;
        }
        if let Some(value) = lookup(ENV_SCRIPTS_PATH) {
            self.scripts_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_CREATE_DB) {
            self.create_database = parse_bool(&value).ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "{ENV_CREATE_DB} is not a valid value: '{value}'. It must be one of \
                     [1,0,t,f,T,F,true,false,True,False,TRUE,FALSE]"
                ),
            })?;
        }
        if let Some(value) = lookup(ENV_SQL_BACKEND) {
            self.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_DUCKDB_PATH) {
            self.duckdb_path = value;
        }
        Ok(self)
    }

    /// Overlay values from the process environment.
    pub fn with_process_environment(self) -> CoreResult<Self> {
        self.with_environment(|key| std::env::var(key).ok())
    }

    /// Check values that end up interpolated into SQL.
    pub fn validate(&self) -> CoreResult<()> {
        validate_identifier("database name", &self.database)?;
        validate_identifier("version table name", &self.version_table)?;
        Ok(())
    }
}

/// Parse a boolean using the spellings accepted for `CREATE_DB`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Ensure `value` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn validate_identifier(what: &str, value: &str) -> CoreResult<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CoreError::ConfigInvalid {
            message: format!("{what} '{value}' is not a valid SQL identifier"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
